//! 倒计时器 - 基础设施层
//!
//! 持有唯一的 tick 任务，每个间隔回调一次剩余秒数，归零时回调一次到期

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::error::{AppResult, ExamError};

/// 取消句柄
#[derive(Debug, Clone)]
pub struct TimerHandle {
    running: Arc<AtomicBool>,
    abort: AbortHandle,
}

impl TimerHandle {
    /// 停止计时，之后不会再有任何回调
    pub fn cancel(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.abort.abort();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// 倒计时器
///
/// 职责：
/// - 每个 `tick_interval` 调用一次 `on_tick(剩余秒数)`，值不会为负
/// - 剩余归零时调用且只调用一次 `on_expire`
/// - 同一时间只允许一个计时任务
pub struct CountdownTimer {
    tick_interval: Duration,
    current: Option<TimerHandle>,
}

impl CountdownTimer {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            current: None,
        }
    }

    /// 启动倒计时
    ///
    /// 必须在 tokio 运行时内调用。第一次 tick 在启动一个间隔之后。
    ///
    /// # 参数
    /// - `initial_seconds`: 起始剩余秒数，为 0 时立即到期
    /// - `on_tick`: 每跳回调，参数为新的剩余秒数
    /// - `on_expire`: 到期回调
    ///
    /// # 返回
    /// 上一个计时仍在运行时返回 `InvalidState`
    pub fn start<T, E>(
        &mut self,
        initial_seconds: u64,
        mut on_tick: T,
        on_expire: E,
    ) -> AppResult<TimerHandle>
    where
        T: FnMut(u64) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        if self.is_running() {
            return Err(ExamError::invalid_state("start_timer", "Running"));
        }

        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let period = self.tick_interval;

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            let mut remaining = initial_seconds;

            while remaining > 0 {
                interval.tick().await;
                if !flag.load(Ordering::SeqCst) {
                    return;
                }
                remaining -= 1;
                on_tick(remaining);
            }

            if flag.swap(false, Ordering::SeqCst) {
                debug!("⏰ 倒计时结束");
                on_expire();
            }
        });

        let handle = TimerHandle {
            running,
            abort: task.abort_handle(),
        };
        self.current = Some(handle.clone());
        debug!("⏱️ 倒计时启动: {} 秒", initial_seconds);
        Ok(handle)
    }

    /// 取消当前计时（没有计时时无操作）
    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(TimerHandle::is_running)
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
