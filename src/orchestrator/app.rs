//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：根据配置创建后端客户端、兜底存储
//! 2. **单次作答**：加载试题，按终端命令驱动控制器，直到提交完成或退出
//! 3. **兜底查看**：读取本地保存的作答
//! 4. **公告分析**：把公告文本发给分析服务并输出结果
//!
//! 只做调度和输出，不做业务判断。

use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::clients::{
    AnalysisClient, BackendClient, FileQuestionSource, QuestionSource, SimuladoConfig,
};
use crate::config::Config;
use crate::error::{AppResult, ExamError};
use crate::models::edital::{AnalysisRequest, EditalAnalysis};
use crate::models::{Direction, SessionSnapshot, SubmissionState};
use crate::orchestrator::command::Command;
use crate::services::{FallbackStore, FileFallbackStore, SubmissionGateway, SubmitOutcome};
use crate::utils::{format_remaining, logging, progress_percent, truncate_text, TimerUrgency};
use crate::workflow::ExamSessionController;

/// 一条命令执行后是否继续读取输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// 应用主结构
pub struct App {
    config: Config,
    backend: Arc<BackendClient>,
    store: Arc<FileFallbackStore>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        logging::log_startup(&config.api_base_url, &config.fallback_dir);

        let backend = Arc::new(BackendClient::new(&config));
        let store = Arc::new(FileFallbackStore::new(&config.fallback_dir));
        Self {
            config,
            backend,
            store,
        }
    }

    /// 进行一次模拟考试
    pub async fn run_session(&self, session_id: &str) -> AppResult<()> {
        let controller = self.load(session_id).await?;
        render_question(&controller);
        print_help();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut state_rx = controller.subscribe();
        let mut urgency = TimerUrgency::Normal;
        let mut last_state = SubmissionState::InProgress;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            info!("输入结束");
                            break;
                        }
                        Err(e) => {
                            close_session(&controller).await;
                            return Err(ExamError::storage("stdin", e));
                        }
                    };
                    if self.handle_line(&controller, &line).await == Flow::Quit {
                        break;
                    }
                    // 命令引起的变化已在上面输出
                    last_state = state_rx.borrow_and_update().state;
                }
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = state_rx.borrow_and_update().clone();
                    urgency = report_urgency(&snapshot, urgency);
                    if snapshot.state != last_state {
                        last_state = snapshot.state;
                        if report_auto_submit(&controller, &snapshot) == Flow::Quit {
                            break;
                        }
                    }
                }
            }
        }

        close_session(&controller).await;
        Ok(())
    }

    async fn load(&self, session_id: &str) -> AppResult<ExamSessionController> {
        let gateway = SubmissionGateway::new(self.backend.clone(), self.store.clone())
            .with_timeout(self.config.submit_timeout());

        let source: Arc<dyn QuestionSource> = match &self.config.session_file {
            Some(path) => {
                info!("📂 使用离线试题: {}", path);
                Arc::new(FileQuestionSource::from_file(path))
            }
            None => {
                if let Err(e) = self.backend.start_simulado(session_id).await {
                    warn!("⚠️ 无法标记开始时间: {}", e);
                }
                self.backend.clone() as Arc<dyn QuestionSource>
            }
        };

        ExamSessionController::load_session(
            source.as_ref(),
            session_id,
            gateway,
            self.config.tick_interval(),
        )
        .await
    }

    /// 执行一行输入
    async fn handle_line(&self, controller: &ExamSessionController, line: &str) -> Flow {
        let Some(command) = Command::parse(line) else {
            if !line.trim().is_empty() {
                warn!("无法识别的命令: {}", truncate_text(line.trim(), 20));
                print_help();
            }
            return Flow::Continue;
        };

        let result = match command {
            Command::Next => controller.advance(Direction::Next).map(drop),
            Command::Previous => controller.advance(Direction::Previous).map(drop),
            Command::GoTo(index) => controller.go_to(index).map(drop),
            Command::Answer(option) => controller.select_current(option).map(drop),
            Command::Resume => controller.resume().map(drop),
            Command::Submit => return self.handle_submit(controller).await,
            Command::Quit => return Flow::Quit,
        };

        match result {
            Ok(_) => render_question(controller),
            Err(e) => report_error(&e),
        }
        Flow::Continue
    }

    async fn handle_submit(&self, controller: &ExamSessionController) -> Flow {
        let session_id = controller.snapshot().session_id;
        match controller.submit().await {
            Ok(outcome) => {
                logging::log_submit_result(&session_id, &outcome);
                match outcome {
                    SubmitOutcome::Confirmed(_) => {
                        logging::log_breakdown(&controller.breakdown());
                        Flow::Quit
                    }
                    SubmitOutcome::SavedLocally { .. } => {
                        logging::log_breakdown(&controller.breakdown());
                        info!("输入 s 重试远程提交，q 退出");
                        Flow::Continue
                    }
                    SubmitOutcome::Ignored => Flow::Continue,
                }
            }
            Err(e) => {
                report_error(&e);
                if controller.snapshot().state == SubmissionState::Failed {
                    info!("输入 s 重试提交，r 继续作答");
                }
                Flow::Continue
            }
        }
    }

    /// 查看本地保存的作答
    pub async fn recover(&self, session_id: &str) -> AppResult<()> {
        match self.store.load(session_id).await? {
            Some(record) => {
                info!("💾 找到模拟考试 {} 的本地记录", record.session_id);
                info!("🕐 完成时间: {}", record.completed_at.to_rfc3339());
                info!("⏱️ 用时: {}", format_remaining(record.elapsed_seconds));
                info!("📝 已作答 {} 题", record.answers.len());
                for (question_id, option) in &record.answers {
                    info!("  题目 {} → {}", question_id, option_label(*option));
                }
            }
            None => {
                warn!(
                    "⚠️ 没有找到模拟考试 {} 的本地记录 (目录: {})",
                    session_id,
                    self.store.dir().display()
                );
            }
        }
        Ok(())
    }

    /// 查询已提交模拟考试的结果
    pub async fn show_result(&self, session_id: &str) -> AppResult<()> {
        let ack = self.backend.get_result(session_id).await?;
        info!(
            "📊 模拟考试 {} 结果: 得分 {}% ({}/{})",
            session_id, ack.score, ack.correct_count, ack.total_count
        );
        Ok(())
    }

    /// 在后端生成新的模拟考试
    ///
    /// # 返回
    /// 新模拟考试的ID，可直接用于 `run`
    pub async fn create(&self, config: &SimuladoConfig) -> AppResult<String> {
        let created = self.backend.create_simulado(config).await?;
        info!(
            "🆕 已创建模拟考试 {}: {} ({} 道题, {} 分钟)",
            created.id,
            truncate_text(&created.title, 60),
            created.total_questions,
            created.time_limit
        );
        Ok(created.id)
    }

    /// 获取示例公告的分析结果
    pub async fn analyze_sample(&self) -> AppResult<()> {
        let client = AnalysisClient::new(&self.config);
        let analysis = client.analyze_sample().await?;
        print_analysis(&analysis);
        Ok(())
    }

    /// 分析公告文件
    pub async fn analyze(&self, path: &Path, banca: Option<&str>) -> AppResult<()> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ExamError::storage(path.display().to_string(), e))?;

        let mut request = AnalysisRequest::new(content);
        if let Some(banca) = banca {
            request = request.with_banca(banca);
        }

        let client = AnalysisClient::new(&self.config);
        let analysis = client.analyze(&request).await?;
        print_analysis(&analysis);
        Ok(())
    }
}

/// 结束本次作答：停止计时，并等待进行中的提交落定
async fn close_session(controller: &ExamSessionController) {
    if controller.snapshot().state == SubmissionState::Submitting {
        info!("⏳ 正在等待提交完成...");
    }
    let snapshot = controller.shutdown().await;
    match snapshot.state {
        SubmissionState::Submitted => {}
        SubmissionState::SubmittedLocally => warn!(
            "⚠️ 模拟考试 {} 提交可能尚未确认，作答已保存到本地",
            snapshot.session_id
        ),
        SubmissionState::Failed => warn!(
            "⚠️ 模拟考试 {} 提交失败且未能保存到本地",
            snapshot.session_id
        ),
        SubmissionState::InProgress | SubmissionState::Submitting => {
            controller.abandon();
        }
    }
}

// ========== 输出辅助函数 ==========

fn option_label(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i).to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

fn print_help() {
    info!("命令: n 下一题 | p 上一题 | g <k> 跳题 | a <k> 作答 | s 提交 | r 继续 | q 退出");
}

fn render_question(controller: &ExamSessionController) {
    let snapshot = controller.snapshot();
    let question = controller.current_question();
    let chosen = controller.answer_for(&question.id);

    println!();
    println!(
        "[{}/{}] ⏱️ {} ({}%) | 已作答 {}/{} | {}",
        snapshot.current_index + 1,
        snapshot.total_questions,
        format_remaining(snapshot.remaining_seconds),
        progress_percent(snapshot.remaining_seconds, snapshot.time_limit_seconds),
        snapshot.answered,
        snapshot.total_questions,
        question.subject
    );
    println!("{}", question.text);
    for (index, option) in question.options.iter().enumerate() {
        let marker = if chosen == Some(index) { "●" } else { "○" };
        println!("  {} {}) {}", marker, option_label(index), option);
    }
}

fn report_urgency(snapshot: &SessionSnapshot, previous: TimerUrgency) -> TimerUrgency {
    if snapshot.state != SubmissionState::InProgress {
        return previous;
    }
    let current = TimerUrgency::from_remaining(snapshot.remaining_seconds);
    if current != previous {
        match current {
            TimerUrgency::Warning => warn!(
                "⏳ 剩余时间 {}",
                format_remaining(snapshot.remaining_seconds)
            ),
            TimerUrgency::Critical => warn!(
                "🚨 最后 {}，时间到将自动提交",
                format_remaining(snapshot.remaining_seconds)
            ),
            TimerUrgency::Normal => {}
        }
    }
    current
}

/// 输出倒计时到期触发的自动提交结果
fn report_auto_submit(controller: &ExamSessionController, snapshot: &SessionSnapshot) -> Flow {
    let elapsed = snapshot.time_limit_seconds - snapshot.remaining_seconds;
    match snapshot.state {
        SubmissionState::Submitted => {
            info!(
                "✅ 模拟考试 {} 已自动提交，用时 {}",
                snapshot.session_id,
                format_remaining(elapsed)
            );
            logging::log_breakdown(&controller.breakdown());
            Flow::Quit
        }
        SubmissionState::SubmittedLocally => {
            warn!(
                "⚠️ 模拟考试 {} 提交可能尚未确认，作答已保存到本地。输入 s 重试，q 退出",
                snapshot.session_id
            );
            Flow::Continue
        }
        SubmissionState::Failed => {
            warn!("⚠️ 自动提交失败且未能保存到本地。输入 s 重试");
            Flow::Continue
        }
        SubmissionState::InProgress | SubmissionState::Submitting => Flow::Continue,
    }
}

/// InvalidState / InvalidAnswer 只记录 debug，其余展示给用户
fn report_error(err: &ExamError) {
    if err.is_caller_bug() {
        debug!("忽略操作: {}", err);
    } else if err.is_retryable() {
        warn!("⚠️ {}（可重试）", err);
    } else {
        error!("❌ {}", err);
    }
}

fn print_analysis(analysis: &EditalAnalysis) {
    let result = &analysis.resultado;
    info!("{}", "=".repeat(60));
    info!(
        "📄 公告分析完成 ({}) - 用时 {:.2}s",
        analysis.status, analysis.tempo_processamento
    );

    if let Some(basic) = &result.analise_basica {
        info!(
            "🏛️ 机构: {} | 主办: {}",
            basic.banca_organizadora.as_deref().unwrap_or("-"),
            basic.orgao_responsavel.as_deref().unwrap_or("-")
        );
        info!(
            "📑 {} 节, {} 词",
            basic.numero_secoes, basic.palavras_totais
        );
    }

    let info_ext = &result.informacoes_extraidas;
    info!(
        "👥 职位 {} 个, 名额合计 {}",
        info_ext.cargos.len(),
        info_ext.total_vagas()
    );
    for cargo in &info_ext.cargos {
        info!("  • {}", truncate_text(&cargo.cargo, 60));
    }
    for disciplina in &info_ext.disciplinas {
        info!("  📚 {} ({})", disciplina.disciplina, disciplina.tipo);
    }
    for data in &info_ext.datas {
        info!("  📅 {} - {}", data.data, data.tipo);
    }
    for valor in &info_ext.valores {
        info!("  💰 {} - {}", valor.valor_formatado, valor.tipo);
    }
    if let Some(resumo) = &result.resumo_executivo {
        info!("📝 {}", truncate_text(resumo, 200));
    }
    info!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ScoringEndpoint, ServerAck, SubmissionPayload};
    use crate::error::SubmissionError;
    use crate::models::{ExamSession, Question};
    use async_trait::async_trait;
    use std::time::Duration;

    /// 延迟后返回网络错误的评分接口
    struct UnreachableBackend;

    #[async_trait]
    impl ScoringEndpoint for UnreachableBackend {
        async fn submit(&self, _payload: &SubmissionPayload) -> Result<ServerAck, SubmissionError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(SubmissionError::Network("connection reset".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_while_auto_submitting_keeps_answers() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileFallbackStore::new(dir.path()));
        let question = Question {
            id: "1".to_string(),
            text: "Capital do Brasil?".to_string(),
            options: vec!["Rio de Janeiro".into(), "Brasília".into()],
            correct_answer: 1,
            explanation: None,
            subject: "Geografia".to_string(),
        };
        let session = ExamSession::new("31", vec![question], 2).unwrap();
        let gateway = SubmissionGateway::new(Arc::new(UnreachableBackend), store.clone());
        let controller = ExamSessionController::new(session, gateway, Duration::from_secs(1));
        controller.start().unwrap();
        controller.select_current(1).unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(controller.snapshot().state, SubmissionState::Submitting);

        close_session(&controller).await;

        assert_eq!(
            controller.snapshot().state,
            SubmissionState::SubmittedLocally
        );
        let record = store.load("31").await.unwrap().unwrap();
        assert_eq!(record.answers.get("1"), Some(&1));
        assert_eq!(record.elapsed_seconds, 2);
    }

    #[test]
    fn test_option_labels() {
        assert_eq!(option_label(0), "A");
        assert_eq!(option_label(3), "D");
        assert_eq!(option_label(30), "31");
    }

    #[test]
    fn test_urgency_only_changes_while_in_progress() {
        let mut snapshot = SessionSnapshot {
            session_id: "1".to_string(),
            state: SubmissionState::InProgress,
            current_index: 0,
            total_questions: 3,
            answered: 0,
            remaining_seconds: 300,
            time_limit_seconds: 600,
        };
        assert_eq!(
            report_urgency(&snapshot, TimerUrgency::Normal),
            TimerUrgency::Warning
        );

        snapshot.remaining_seconds = 30;
        snapshot.state = SubmissionState::Submitting;
        assert_eq!(
            report_urgency(&snapshot, TimerUrgency::Warning),
            TimerUrgency::Warning
        );
    }
}
