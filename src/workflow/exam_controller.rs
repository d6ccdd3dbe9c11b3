//! 模拟考试会话控制 - 流程层
//!
//! 核心职责：把"作答状态机 + 倒计时 + 提交网关"编排成一次完整的模拟考试
//!
//! 流程顺序：
//! 1. 加载试题 → 启动倒计时
//! 2. 作答 / 翻题
//! 3. 手动提交或倒计时到期 → 远程提交
//! 4. 远程失败 → 本地兜底

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clients::QuestionSource;
use crate::error::{AppResult, ExamError};
use crate::infrastructure::CountdownTimer;
use crate::models::{
    Direction, ExamSession, Question, SessionSnapshot, SubjectBreakdown, SubmissionState,
};
use crate::services::{FallbackRecord, SubmissionGateway, SubmitOutcome};
use crate::utils::logging;

/// 模拟考试会话控制器
///
/// - 持有唯一的会话，所有状态变化都在同一把锁内完成
/// - 锁内只做同步操作，不跨越 `.await`
/// - `submit()` 在第一次 `.await` 之前就离开 InProgress，
///   因此倒计时到期与手动提交同时发生时只会提交一次
/// - 可 `Clone`，克隆体共享同一个会话
#[derive(Clone)]
pub struct ExamSessionController {
    inner: Arc<Inner>,
}

struct Inner {
    session: Mutex<ExamSession>,
    timer: Mutex<CountdownTimer>,
    gateway: SubmissionGateway,
    state_tx: watch::Sender<SessionSnapshot>,
    auto_submit: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    fn session(&self) -> MutexGuard<'_, ExamSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn timer(&self) -> MutexGuard<'_, CountdownTimer> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn auto_submit(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.auto_submit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// 在锁内修改会话并广播最新快照
    fn update<R>(&self, f: impl FnOnce(&mut ExamSession) -> R) -> R {
        let mut session = self.session();
        let result = f(&mut session);
        self.state_tx.send_replace(session.snapshot());
        result
    }
}

impl ExamSessionController {
    /// 从题目来源加载并立即开始计时
    ///
    /// # 参数
    /// - `source`: 题目来源（后端或本地文件）
    /// - `session_id`: 模拟考试ID
    /// - `gateway`: 提交网关
    /// - `tick_interval`: 倒计时间隔
    ///
    /// # 返回
    /// 加载失败返回 `SessionLoad`，试题不合法返回 `InvalidConfiguration`
    pub async fn load_session(
        source: &dyn QuestionSource,
        session_id: &str,
        gateway: SubmissionGateway,
        tick_interval: Duration,
    ) -> AppResult<Self> {
        let definition = source.get_session(session_id).await?;
        let id = if definition.id.is_empty() {
            session_id.to_string()
        } else {
            definition.id.clone()
        };
        let time_limit = i64::try_from(definition.time_limit_seconds()).unwrap_or(i64::MAX);

        let session = ExamSession::new(id, definition.questions, time_limit)?;
        logging::log_session_loaded(
            &definition.title,
            session.questions().len(),
            definition.time_limit,
        );

        let controller = Self::new(session, gateway, tick_interval);
        controller.start()?;
        Ok(controller)
    }

    /// 用已构建的会话创建控制器（不启动计时）
    pub fn new(session: ExamSession, gateway: SubmissionGateway, tick_interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(session.snapshot());
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(session),
                timer: Mutex::new(CountdownTimer::new(tick_interval)),
                gateway,
                state_tx,
                auto_submit: Mutex::new(None),
            }),
        }
    }

    /// 按当前剩余时间启动倒计时，必须在 InProgress 状态
    pub fn start(&self) -> AppResult<()> {
        let remaining = {
            let session = self.inner.session();
            if session.state() != SubmissionState::InProgress {
                return Err(ExamError::invalid_state("start", session.state()));
            }
            session.remaining_seconds()
        };

        let on_tick_inner = Arc::downgrade(&self.inner);
        let on_expire_inner = Arc::downgrade(&self.inner);

        let mut timer = self.inner.timer();
        timer.cancel();
        timer.start(
            remaining,
            move |r| Self::handle_tick(&on_tick_inner, r),
            move || Self::handle_expire(&on_expire_inner),
        )?;
        Ok(())
    }

    fn handle_tick(inner: &Weak<Inner>, remaining: u64) {
        if let Some(inner) = inner.upgrade() {
            inner.update(|session| session.sync_remaining(remaining));
        }
    }

    fn handle_expire(inner: &Weak<Inner>) {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        let controller = ExamSessionController {
            inner: inner.clone(),
        };
        info!("⏰ 时间到，自动提交");
        let task = tokio::spawn(async move {
            if let Err(e) = controller.submit().await {
                warn!("⚠️ 自动提交未完成: {}", e);
            }
        });
        *inner.auto_submit() = Some(task);
    }

    // ========== 作答 ==========

    /// 记录或覆盖某题的作答
    pub fn select_answer(&self, question_id: &str, option_index: usize) -> AppResult<()> {
        self.inner
            .update(|session| session.select_answer(question_id, option_index))
    }

    /// 回答当前题目
    pub fn select_current(&self, option_index: usize) -> AppResult<()> {
        self.inner.update(|session| {
            let question_id = session.current_question().id.clone();
            session.select_answer(&question_id, option_index)
        })
    }

    pub fn advance(&self, direction: Direction) -> AppResult<usize> {
        self.inner.update(|session| session.advance(direction))
    }

    pub fn go_to(&self, index: usize) -> AppResult<usize> {
        self.inner.update(|session| session.go_to(index))
    }

    // ========== 提交 ==========

    /// 提交作答
    ///
    /// 从 InProgress、Failed、SubmittedLocally 发起；Submitting / Submitted 时
    /// 直接返回 `Ignored`。远程失败时写入本地兜底并返回 `SavedLocally`，
    /// 兜底也失败时返回 `NotSaved`（带上远程错误），会话停留在 Failed。
    pub async fn submit(&self) -> AppResult<SubmitOutcome> {
        let Some(ticket) = self.inner.update(ExamSession::begin_submission) else {
            debug!("重复提交被忽略");
            return Ok(SubmitOutcome::Ignored);
        };
        self.inner.timer().cancel();

        info!(
            "📤 开始提交: 会话 {} | {} 道作答 | 用时 {} 秒",
            ticket.session_id,
            ticket.answers.len(),
            ticket.elapsed_seconds
        );

        match self.inner.gateway.submit(&ticket).await {
            Ok(ack) => {
                self.inner
                    .update(|session| session.finish_submission(true))?;
                Ok(SubmitOutcome::Confirmed(ack))
            }
            Err(error) => {
                self.inner
                    .update(|session| session.finish_submission(false))?;

                let record = FallbackRecord::from(&ticket);
                let path = self
                    .inner
                    .gateway
                    .persist_fallback(&record)
                    .await
                    .map_err(|e| ExamError::not_saved(error.clone(), e))?;

                self.inner.update(ExamSession::mark_saved_locally)?;
                Ok(SubmitOutcome::SavedLocally { error, path })
            }
        }
    }

    /// 提交失败后继续作答，并以剩余时间重新计时
    pub fn resume(&self) -> AppResult<()> {
        self.inner.update(ExamSession::resume)?;
        info!("▶️ 继续作答");
        self.start()
    }

    /// 放弃本次作答，停止计时
    pub fn abandon(&self) {
        self.inner.timer().cancel();
        info!("🛑 已放弃模拟考试 {}", self.inner.session().id());
    }

    /// 退出前调用：停止计时，并等待进行中的提交（含自动提交）结束
    ///
    /// # 返回
    /// 提交落定后的快照；没有进行中的提交时立即返回
    pub async fn shutdown(&self) -> SessionSnapshot {
        self.inner.timer().cancel();

        let pending = self.inner.auto_submit().take();
        if let Some(task) = pending {
            if let Err(e) = task.await {
                warn!("⚠️ 自动提交任务异常结束: {}", e);
            }
        }

        let mut rx = self.subscribe();
        let snapshot = match rx
            .wait_for(|snapshot| snapshot.state != SubmissionState::Submitting)
            .await
        {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        snapshot
    }

    // ========== 只读视图 ==========

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.session().snapshot()
    }

    pub fn current_question(&self) -> Question {
        self.inner.session().current_question().clone()
    }

    pub fn answer_for(&self, question_id: &str) -> Option<usize> {
        self.inner.session().answers().get(question_id)
    }

    /// 按当前作答计算各科统计
    pub fn breakdown(&self) -> SubjectBreakdown {
        let session = self.inner.session();
        SubjectBreakdown::compute(session.questions(), session.answers())
    }

    /// 订阅状态变化（每跳、每次作答、每次状态转换）
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state_tx.subscribe()
    }

    /// 等待会话进入 Submitted 或 SubmittedLocally
    pub async fn wait_for_terminal(&self) -> SessionSnapshot {
        let mut rx = self.subscribe();
        let snapshot = match rx.wait_for(|snapshot| snapshot.state.is_terminal()).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        snapshot
    }
}
