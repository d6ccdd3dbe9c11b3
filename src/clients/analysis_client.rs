//! 公告分析服务客户端

use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppResult, ExamError};
use crate::models::edital::{AnalysisRequest, EditalAnalysis};

/// 公告分析客户端
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.analysis_api_base_url)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 分析公告正文
    ///
    /// # 参数
    /// - `request`: 公告内容，发送前先做本地校验
    ///
    /// # 返回
    /// 校验失败、网络失败或服务返回错误时均为 `ExamError::Analysis`
    pub async fn analyze(&self, request: &AnalysisRequest) -> AppResult<EditalAnalysis> {
        request.validate().map_err(ExamError::Analysis)?;

        info!(
            "📄 提交公告分析: {} 字符, 机构: {}",
            request.conteudo.chars().count(),
            request.banca.as_deref().unwrap_or("-")
        );

        let response = self
            .http
            .post(format!("{}/analyze", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| ExamError::Analysis(format!("无法连接分析服务: {}", e)))?;

        Self::read_analysis(response).await
    }

    /// 获取示例分析结果
    pub async fn analyze_sample(&self) -> AppResult<EditalAnalysis> {
        let response = self
            .http
            .get(format!("{}/analyze/sample", self.base_url))
            .send()
            .await
            .map_err(|e| ExamError::Analysis(format!("无法连接分析服务: {}", e)))?;

        Self::read_analysis(response).await
    }

    async fn read_analysis(response: reqwest::Response) -> AppResult<EditalAnalysis> {
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| ExamError::Analysis(format!("响应解析失败: {}", e)))?;

        if !status.is_success() {
            let detail = body
                .get("detail")
                .and_then(|v| v.as_str())
                .unwrap_or("Erro na análise");
            return Err(ExamError::Analysis(format!(
                "HTTP {}: {}",
                status.as_u16(),
                detail
            )));
        }

        debug!("分析服务响应: {}", body);
        serde_json::from_value(body)
            .map_err(|e| ExamError::Analysis(format!("响应结构不符: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_short_content_is_rejected_before_sending() {
        // 端口 1 上没有服务，若真的发出请求会得到连接错误而不是长度错误
        let client = AnalysisClient::with_base_url("http://127.0.0.1:1");
        let err = client
            .analyze(&AnalysisRequest::new("Edital curto"))
            .await
            .unwrap_err();

        match err {
            ExamError::Analysis(message) => assert!(message.contains("100")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_service_is_analysis_error() {
        let client = AnalysisClient::with_base_url("http://127.0.0.1:1/");
        let request = AnalysisRequest::new("Edital de abertura de concurso público. ".repeat(5));
        let err = client.analyze(&request).await.unwrap_err();
        assert!(matches!(err, ExamError::Analysis(_)));
    }
}
