use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use simulado_runner::clients::{
    BackendClient, FileQuestionSource, QuestionSource, ScoringEndpoint, ServerAck,
    SubmissionPayload,
};
use simulado_runner::config::Config;
use simulado_runner::error::SubmissionError;
use simulado_runner::models::Direction;
use simulado_runner::services::{FallbackStore, FileFallbackStore};
use simulado_runner::{ExamSessionController, SubmissionGateway, SubmissionState, SubmitOutcome};
use tokio_test::{assert_err, assert_ok};

const SIMULADO: &str = r#"
id = 12
title = "Simulado CESPE - Direito Administrativo"
time_limit = 1

[[questions]]
id = 1
text = "A administração pública direta compreende:"
options = ["Autarquias", "União, Estados, DF e Municípios", "Empresas públicas"]
correct_answer = 1
subject = "Direito Administrativo"

[[questions]]
id = 2
text = "O princípio da publicidade exige:"
options = ["Sigilo dos atos", "Transparência dos atos"]
correct_answer = 1
subject = "Direito Administrativo"

[[questions]]
id = 3
text = "Concordância verbal: assinale a correta."
options = ["Fazem dois anos", "Faz dois anos"]
correct_answer = 1
subject = "Português"
"#;

/// 评分接口替身：记录收到的提交，可切换为失败
struct RecordingEndpoint {
    calls: AtomicUsize,
    fail: bool,
    payloads: Mutex<Vec<SubmissionPayload>>,
}

impl RecordingEndpoint {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
            payloads: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ScoringEndpoint for RecordingEndpoint {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<ServerAck, SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());
        if self.fail {
            return Err(SubmissionError::Rejected {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        let breakdown = payload.subject_breakdown.clone().unwrap_or_default();
        Ok(ServerAck {
            score: breakdown.score_percent(),
            correct_count: breakdown.correct_count(),
            total_count: breakdown.total_count(),
        })
    }
}

async fn load(
    dir: &std::path::Path,
    endpoint: Arc<RecordingEndpoint>,
    store: Arc<FileFallbackStore>,
) -> ExamSessionController {
    std::fs::write(dir.join("12.toml"), SIMULADO).unwrap();
    let source = FileQuestionSource::from_dir(dir);
    let gateway = SubmissionGateway::new(endpoint, store);
    ExamSessionController::load_session(&source, "12", gateway, Duration::from_secs(1))
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_expiry_with_offline_backend_saves_fallback_file() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = Arc::new(RecordingEndpoint::new(true));
    let store = Arc::new(FileFallbackStore::new(dir.path().join("fallback")));
    let controller = load(dir.path(), endpoint.clone(), store.clone()).await;

    assert_ok!(controller.select_answer("1", 1));
    tokio::time::sleep(Duration::from_secs(61)).await;

    let snapshot = controller.wait_for_terminal().await;
    assert_eq!(snapshot.state, SubmissionState::SubmittedLocally);
    assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);

    let path = dir.path().join("fallback").join("session_12.json");
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["sessionId"], "12");
    assert_eq!(json["elapsedSeconds"], 60);
    assert_eq!(json["answers"], serde_json::json!({"1": 1}));
    assert!(json["completedAt"].is_string());

    let record = store.load("12").await.unwrap().unwrap();
    assert_eq!(record.answers.len(), 1);

    // 终态后不可再作答
    assert_err!(controller.select_answer("2", 1));
}

#[tokio::test(start_paused = true)]
async fn test_manual_submit_sends_answers_and_breakdown() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = Arc::new(RecordingEndpoint::new(false));
    let store = Arc::new(FileFallbackStore::new(dir.path().join("fallback")));
    let controller = load(dir.path(), endpoint.clone(), store).await;

    controller.select_current(1).unwrap();
    controller.advance(Direction::Next).unwrap();
    controller.select_current(0).unwrap();
    controller.go_to(2).unwrap();
    controller.select_current(1).unwrap();

    tokio::time::sleep(Duration::from_millis(15_500)).await;
    let outcome = controller.submit().await.unwrap();

    match outcome {
        SubmitOutcome::Confirmed(ack) => {
            assert_eq!(ack.correct_count, 2);
            assert_eq!(ack.total_count, 3);
            assert_eq!(ack.score, 66);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let payload = endpoint.payloads.lock().unwrap()[0].clone();
    assert_eq!(payload.session_id, "12");
    assert_eq!(payload.elapsed_seconds, 15);
    assert_eq!(payload.answers.len(), 3);
    let breakdown = payload.subject_breakdown.unwrap();
    assert_eq!(breakdown.get("Português").unwrap().correct, 1);
    assert_eq!(breakdown.get("Direito Administrativo").unwrap().total, 2);

    assert!(!dir.path().join("fallback").exists());
    assert_eq!(controller.snapshot().state, SubmissionState::Submitted);
}

#[tokio::test]
#[ignore] // 默认忽略，需要本地后端：cargo test -- --ignored
async fn test_load_simulado_from_backend() {
    let _ = tracing_subscriber::fmt::try_init();

    // 加载配置
    let config = Config::from_env().expect("配置加载失败");
    let backend = BackendClient::new(&config);

    let definition = backend.get_session("1").await.expect("取题失败");
    assert!(!definition.questions.is_empty(), "模拟考试应该包含题目");
}
