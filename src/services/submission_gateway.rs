//! 提交网关 - 业务能力层
//!
//! 负责一次远程提交尝试与本地兜底写入，不持有会话状态

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::fallback_store::{FallbackRecord, FallbackStore};
use crate::clients::{ScoringEndpoint, ServerAck, SubmissionPayload};
use crate::error::{AppResult, SubmissionError};
use crate::models::SubmissionTicket;

/// 一次 `submit()` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 服务端确认
    Confirmed(ServerAck),
    /// 远程失败，作答已写入本地
    SavedLocally { error: SubmissionError, path: String },
    /// 正在提交或已提交，本次调用被忽略
    Ignored,
}

impl SubmitOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubmitOutcome::Confirmed(_))
    }
}

impl From<&SubmissionTicket> for SubmissionPayload {
    fn from(ticket: &SubmissionTicket) -> Self {
        Self {
            session_id: ticket.session_id.clone(),
            answers: ticket.answers.clone(),
            elapsed_seconds: ticket.elapsed_seconds,
            subject_breakdown: Some(ticket.breakdown.clone()),
        }
    }
}

impl From<&SubmissionTicket> for FallbackRecord {
    fn from(ticket: &SubmissionTicket) -> Self {
        FallbackRecord::new(
            ticket.session_id.clone(),
            ticket.answers.clone(),
            ticket.elapsed_seconds,
        )
    }
}

/// 提交网关
///
/// 职责：
/// - 每次调用最多一次远程请求，不自动重试
/// - 可选的客户端超时，超时按网络错误处理
/// - 将失败的作答交给兜底存储
pub struct SubmissionGateway {
    endpoint: Arc<dyn ScoringEndpoint>,
    store: Arc<dyn FallbackStore>,
    timeout: Option<Duration>,
}

impl SubmissionGateway {
    pub fn new(endpoint: Arc<dyn ScoringEndpoint>, store: Arc<dyn FallbackStore>) -> Self {
        Self {
            endpoint,
            store,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 发起一次远程提交
    ///
    /// # 参数
    /// - `ticket`: 进入 Submitting 时冻结的作答
    ///
    /// # 返回
    /// 服务端确认，或 `Network` / `Rejected`
    pub async fn submit(&self, ticket: &SubmissionTicket) -> Result<ServerAck, SubmissionError> {
        let payload = SubmissionPayload::from(ticket);
        debug!(
            "📤 提交会话 {}: {} 道作答, 用时 {} 秒",
            payload.session_id,
            payload.answers.len(),
            payload.elapsed_seconds
        );

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.endpoint.submit(&payload)).await
            {
                Ok(result) => result,
                Err(_) => Err(SubmissionError::Network(format!(
                    "timeout after {}s",
                    limit.as_secs()
                ))),
            },
            None => self.endpoint.submit(&payload).await,
        };

        if let Err(e) = &result {
            warn!("❌ 会话 {} 远程提交失败: {}", payload.session_id, e);
        }
        result
    }

    /// 写入本地兜底，返回存储位置
    pub async fn persist_fallback(&self, record: &FallbackRecord) -> AppResult<String> {
        self.store.persist(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubjectBreakdown;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct SlowEndpoint {
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScoringEndpoint for SlowEndpoint {
        async fn submit(&self, payload: &SubmissionPayload) -> Result<ServerAck, SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(ServerAck {
                score: 100,
                correct_count: payload.answers.len() as u32,
                total_count: payload.answers.len() as u32,
            })
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<FallbackRecord>>,
    }

    #[async_trait]
    impl FallbackStore for MemoryStore {
        async fn persist(&self, record: &FallbackRecord) -> AppResult<String> {
            self.records.lock().unwrap().push(record.clone());
            Ok(format!("memory://{}", record.session_id))
        }

        async fn load(&self, session_id: &str) -> AppResult<Option<FallbackRecord>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|r| r.session_id == session_id)
                .cloned())
        }
    }

    fn ticket() -> SubmissionTicket {
        let mut answers = BTreeMap::new();
        answers.insert("q1".to_string(), 0);
        SubmissionTicket {
            session_id: "5".to_string(),
            answers,
            elapsed_seconds: 30,
            breakdown: SubjectBreakdown::default(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_maps_to_network_error_after_one_attempt() {
        let endpoint = Arc::new(SlowEndpoint {
            delay: Duration::from_secs(60),
            calls: AtomicUsize::new(0),
        });
        let gateway = SubmissionGateway::new(endpoint.clone(), Arc::new(MemoryStore::default()))
            .with_timeout(Some(Duration::from_secs(5)));

        let err = gateway.submit(&ticket()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Network(ref m) if m.contains("timeout")));
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_timeout_waits_for_endpoint() {
        let endpoint = Arc::new(SlowEndpoint {
            delay: Duration::from_secs(60),
            calls: AtomicUsize::new(0),
        });
        let gateway = SubmissionGateway::new(endpoint, Arc::new(MemoryStore::default()));

        let ack = tokio_test::assert_ok!(gateway.submit(&ticket()).await);
        assert_eq!(ack.correct_count, 1);
    }

    #[tokio::test]
    async fn test_persist_goes_through_store() {
        let store = Arc::new(MemoryStore::default());
        let gateway = SubmissionGateway::new(
            Arc::new(SlowEndpoint {
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }),
            store.clone(),
        );

        let record = FallbackRecord::from(&ticket());
        let location = gateway.persist_fallback(&record).await.unwrap();
        assert_eq!(location, "memory://5");
        assert_eq!(store.records.lock().unwrap().len(), 1);

        let loaded = store.load("5").await.unwrap().unwrap();
        assert_eq!(loaded.elapsed_seconds, 30);
    }

    #[test]
    fn test_payload_from_ticket_carries_breakdown() {
        let payload = SubmissionPayload::from(&ticket());
        assert_eq!(payload.session_id, "5");
        assert_eq!(payload.elapsed_seconds, 30);
        assert!(payload.subject_breakdown.is_some());
    }
}
