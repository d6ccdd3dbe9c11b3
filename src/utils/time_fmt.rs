//! 倒计时显示辅助

/// 剩余时间紧迫程度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerUrgency {
    Normal,
    /// 不超过 5 分钟
    Warning,
    /// 不超过 1 分钟
    Critical,
}

impl TimerUrgency {
    pub fn from_remaining(remaining_seconds: u64) -> Self {
        if remaining_seconds <= 60 {
            TimerUrgency::Critical
        } else if remaining_seconds <= 300 {
            TimerUrgency::Warning
        } else {
            TimerUrgency::Normal
        }
    }
}

/// 格式化剩余时间：满一小时显示 `h:mm:ss`，否则 `m:ss`
pub fn format_remaining(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// 已用时间占比（0-100）
pub fn progress_percent(remaining_seconds: u64, total_seconds: u64) -> u8 {
    if total_seconds == 0 {
        return 100;
    }
    let elapsed = total_seconds.saturating_sub(remaining_seconds);
    ((elapsed * 100 + total_seconds / 2) / total_seconds).min(100) as u8
}
