/// 后端 API 客户端
///
/// 封装所有与模拟考试后端相关的调用逻辑：取题、提交、创建、开始、查询结果
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{QuestionSource, ScoringEndpoint};
use crate::config::Config;
use crate::error::{AppResult, ExamError, SubmissionError};
use crate::models::{SessionDefinition, SubjectBreakdown};

/// 提交内容（领域层）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub session_id: String,
    pub answers: BTreeMap<String, usize>,
    pub elapsed_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_breakdown: Option<SubjectBreakdown>,
}

/// 评分确认
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAck {
    pub score: u32,
    #[serde(alias = "correct_answers", alias = "correctCount")]
    pub correct_count: u32,
    #[serde(default, alias = "totalCount")]
    pub total_count: u32,
}

/// 生成模拟考试的参数
#[derive(Debug, Clone, Serialize)]
pub struct SimuladoConfig {
    pub title: String,
    pub banca: String,
    pub subjects: Vec<String>,
    pub num_questions: u32,
    /// 分钟
    pub time_limit: u32,
    pub level: String,
}

/// 新建模拟考试的回执
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedSimulado {
    #[serde(deserialize_with = "crate::models::question::deserialize_id")]
    pub id: String,
    pub title: String,
    pub time_limit: u64,
    pub total_questions: u32,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(flatten)]
    ack: ServerAck,
    #[serde(default)]
    subject_scores: Option<SubjectBreakdown>,
}

/// 后端客户端
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    /// 创建新的后端客户端
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.api_base_url, config.access_token.clone())
    }

    pub fn with_base_url(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// 创建模拟考试
    pub async fn create_simulado(&self, config: &SimuladoConfig) -> AppResult<CreatedSimulado> {
        let endpoint = "/simulados/";
        let body = json!({
            "title": config.title,
            "config": {
                "banca": config.banca,
                "subjects": config.subjects,
                "num_questions": config.num_questions,
                "time_limit": config.time_limit,
                "level": config.level,
            },
            "time_limit": config.time_limit,
            "total_questions": config.num_questions,
        });
        debug!("创建模拟考试 Payload: {}", body);

        let response = self
            .authorized(self.http.post(self.url(endpoint)).json(&body))
            .send()
            .await
            .map_err(|e| ExamError::backend(endpoint, e))?;
        read_json(endpoint, response).await
    }

    /// 标记模拟考试开始
    pub async fn start_simulado(&self, session_id: &str) -> AppResult<()> {
        let endpoint = format!("/simulados/{}/start", session_id);
        let response = self
            .authorized(self.http.post(self.url(&endpoint)))
            .send()
            .await
            .map_err(|e| ExamError::backend(&endpoint, e))?;
        let _: Value = read_json(&endpoint, response).await?;
        Ok(())
    }

    /// 查询已提交的结果
    pub async fn get_result(&self, session_id: &str) -> AppResult<ServerAck> {
        let endpoint = format!("/simulados/{}/result", session_id);
        let response = self
            .authorized(self.http.get(self.url(&endpoint)))
            .send()
            .await
            .map_err(|e| ExamError::backend(&endpoint, e))?;
        let parsed: SubmitResponse = read_json(&endpoint, response).await?;
        Ok(complete_ack(parsed))
    }
}

#[async_trait]
impl QuestionSource for BackendClient {
    async fn get_session(&self, session_id: &str) -> AppResult<SessionDefinition> {
        let endpoint = format!("/simulados/{}", session_id);
        debug!("获取模拟考试: {}", endpoint);

        let response = self
            .authorized(self.http.get(self.url(&endpoint)))
            .send()
            .await
            .map_err(|e| ExamError::session_load(session_id, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            return Err(ExamError::session_load(
                session_id,
                format!("HTTP {}: {}", status.as_u16(), detail),
            ));
        }

        response
            .json::<SessionDefinition>()
            .await
            .map_err(|e| ExamError::session_load(session_id, format!("响应解析失败: {}", e)))
    }
}

#[async_trait]
impl ScoringEndpoint for BackendClient {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<ServerAck, SubmissionError> {
        let endpoint = format!("/simulados/{}/submit", payload.session_id);
        let body = submit_body(payload);
        debug!("提交作答 Payload: {}", body);

        let response = self
            .authorized(self.http.post(self.url(&endpoint)).json(&body))
            .send()
            .await
            .map_err(SubmissionError::from)?;

        let status = response.status();
        if !status.is_success() {
            let message = error_detail(response).await;
            warn!("⚠️ 提交被拒绝 HTTP {}: {}", status.as_u16(), message);
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SubmitResponse =
            response
                .json()
                .await
                .map_err(|e| SubmissionError::Rejected {
                    status: status.as_u16(),
                    message: format!("响应解析失败: {}", e),
                })?;
        Ok(complete_ack(parsed))
    }
}

// ========== 辅助函数 ==========

/// 构建后端提交接口的请求体
fn submit_body(payload: &SubmissionPayload) -> Value {
    // 后端的 simulado_id 是整数，离线会话可能是字符串
    let simulado_id = payload
        .session_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(payload.session_id.clone()));

    json!({
        "simulado_id": simulado_id,
        "answers": payload.answers,
        "time_spent": payload.elapsed_seconds,
        "subject_scores": payload.subject_breakdown.clone().unwrap_or_default(),
    })
}

/// 后端结果不带题目总数时，用科目统计补齐
fn complete_ack(parsed: SubmitResponse) -> ServerAck {
    let mut ack = parsed.ack;
    if ack.total_count == 0 {
        if let Some(breakdown) = parsed.subject_scores {
            ack.total_count = breakdown.total_count();
        }
    }
    ack
}

/// 读取错误响应中的 `detail` 字段
async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<Value>().await {
        Ok(body) => body
            .get("detail")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        Err(_) => format!("HTTP {}", status.as_u16()),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        let detail = error_detail(response).await;
        return Err(ExamError::backend(
            endpoint,
            format!("HTTP {}: {}", status.as_u16(), detail),
        ));
    }
    response
        .json()
        .await
        .map_err(|e| ExamError::backend(endpoint, format!("响应解析失败: {}", e)))
}
