//! 外部服务客户端
//!
//! - `QuestionSource`：按会话ID提供题目与时间限制
//! - `ScoringEndpoint`：接收最终作答并返回评分
//!
//! 后端 HTTP 实现见 `BackendClient`，离线实现见 `FileQuestionSource`。

pub mod analysis_client;
pub mod backend_client;
pub mod file_source;

pub use analysis_client::AnalysisClient;
pub use backend_client::{BackendClient, ServerAck, SimuladoConfig, SubmissionPayload};
pub use file_source::FileQuestionSource;

use async_trait::async_trait;

use crate::error::{AppResult, SubmissionError};
use crate::models::SessionDefinition;

/// 题目来源
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// 获取模拟考试定义，失败时返回 `SessionLoad`
    async fn get_session(&self, session_id: &str) -> AppResult<SessionDefinition>;
}

/// 评分接口
///
/// 每次调用最多发起一次远程请求，不做重试
#[async_trait]
pub trait ScoringEndpoint: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<ServerAck, SubmissionError>;
}
