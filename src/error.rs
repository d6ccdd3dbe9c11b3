use thiserror::Error;

/// 应用程序错误类型
///
/// 分类与处理策略：
/// - `InvalidConfiguration`：模拟考试配置不合法，会话无法开始（致命）
/// - `InvalidState` / `InvalidAnswer`：调用方时序错误，本地吸收，不展示给用户
/// - `SessionLoad`：题目来源无法提供试题，展示并允许重试
/// - `Submission`：远程提交失败，已走本地兜底，提示"可能尚未确认"
/// - `NotSaved`：远程与本地都失败，会话停留在 Failed，可重试或继续作答
#[derive(Debug, Error)]
pub enum ExamError {
    /// 会话配置错误
    #[error("模拟考试配置错误: {reason}")]
    InvalidConfiguration { reason: String },

    /// 当前状态不允许该操作
    #[error("操作 {operation} 在状态 {state} 下无效")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// 作答参数错误（题目不存在或选项越界）
    #[error("无效作答: 题目 {question_id}, 选项 {option_index}")]
    InvalidAnswer {
        question_id: String,
        option_index: usize,
    },

    /// 加载试题失败
    #[error("加载模拟考试 {session_id} 失败: {message}")]
    SessionLoad { session_id: String, message: String },

    /// 远程提交失败
    #[error("提交失败: {0}")]
    Submission(#[from] SubmissionError),

    /// 本地兜底存储失败
    #[error("本地存储失败 ({path}): {source}")]
    Storage {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 远程提交失败，本地兜底也失败
    #[error("提交失败 ({submission}) 且未能保存到本地: {storage}")]
    NotSaved {
        submission: SubmissionError,
        #[source]
        storage: Box<ExamError>,
    },

    /// 后端接口调用失败（非提交类请求）
    #[error("API请求失败 ({endpoint}): {message}")]
    Backend { endpoint: String, message: String },

    /// 公告分析服务错误
    #[error("公告分析失败: {0}")]
    Analysis(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 提交错误
///
/// 两种错误都会触发本地兜底，区分仅用于错误报告
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// 没有收到响应
    #[error("网络错误: {0}")]
    Network(String),
    /// 服务端返回非成功状态
    #[error("服务端拒绝 (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少必需参数
    #[error("缺少参数: {0}")]
    MissingArgument(String),
}

// ========== 便捷构造函数 ==========

impl ExamError {
    /// 创建配置错误
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        ExamError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// 创建状态错误
    pub fn invalid_state(operation: &'static str, state: impl std::fmt::Display) -> Self {
        ExamError::InvalidState {
            operation,
            state: state.to_string(),
        }
    }

    /// 创建加载错误
    pub fn session_load(session_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ExamError::SessionLoad {
            session_id: session_id.into(),
            message: message.to_string(),
        }
    }

    /// 创建后端接口错误
    pub fn backend(endpoint: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ExamError::Backend {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// 创建存储错误
    pub fn storage(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ExamError::Storage {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// 创建"远程失败且未能落盘"错误
    pub fn not_saved(submission: SubmissionError, storage: ExamError) -> Self {
        ExamError::NotSaved {
            submission,
            storage: Box::new(storage),
        }
    }

    /// 是否为调用方时序错误（应静默吸收）
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            ExamError::InvalidState { .. } | ExamError::InvalidAnswer { .. }
        )
    }

    /// 是否值得给用户提供重试入口
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExamError::SessionLoad { .. }
                | ExamError::Submission(_)
                | ExamError::Storage { .. }
                | ExamError::NotSaved { .. }
                | ExamError::Backend { .. }
        )
    }
}

impl From<reqwest::Error> for SubmissionError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SubmissionError::Rejected {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => SubmissionError::Network(err.to_string()),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, ExamError>;
