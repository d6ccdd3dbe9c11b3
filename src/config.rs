use std::time::Duration;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 后端 API 地址（题目来源 + 评分接口）
    pub api_base_url: String,
    /// 公告分析服务地址
    pub analysis_api_base_url: String,
    /// Bearer 令牌
    pub access_token: Option<String>,
    /// 本地兜底文件目录
    pub fallback_dir: String,
    /// 倒计时每一跳的间隔（毫秒）
    pub tick_interval_ms: u64,
    /// 提交请求超时（秒），None 表示只依赖底层传输
    pub submit_timeout_secs: Option<u64>,
    /// 离线试题文件（TOML），设置后不再请求后端取题
    pub session_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            analysis_api_base_url: "http://localhost:8000".to_string(),
            access_token: None,
            fallback_dir: "fallback".to_string(),
            tick_interval_ms: 1000,
            submit_timeout_secs: None,
            session_file: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            analysis_api_base_url: std::env::var("ANALYSIS_API_BASE_URL")
                .unwrap_or(default.analysis_api_base_url),
            access_token: std::env::var("ACCESS_TOKEN").ok().filter(|v| !v.is_empty()),
            fallback_dir: std::env::var("FALLBACK_DIR").unwrap_or(default.fallback_dir),
            tick_interval_ms: parse_var("TICK_INTERVAL_MS", "u64")?
                .unwrap_or(default.tick_interval_ms),
            submit_timeout_secs: parse_var("SUBMIT_TIMEOUT_SECS", "u64")?,
            session_file: std::env::var("SESSION_FILE").ok().filter(|v| !v.is_empty()),
            verbose_logging: std::env::var("VERBOSE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn submit_timeout(&self) -> Option<Duration> {
        self.submit_timeout_secs.map(Duration::from_secs)
    }
}

/// 读取并解析可选的数值型环境变量，存在但无法解析时报错
fn parse_var<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        _ => Ok(None),
    }
}
