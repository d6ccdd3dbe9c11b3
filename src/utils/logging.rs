/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::models::SubjectBreakdown;
use crate::services::SubmitOutcome;

/// 初始化 tracing 订阅者
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(api_base_url: &str, fallback_dir: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 模拟考试模式");
    info!("🌐 后端地址: {}", api_base_url);
    info!("💾 本地兜底目录: {}", fallback_dir);
    info!("{}", "=".repeat(60));
}

/// 记录试题加载信息
///
/// # 参数
/// - `title`: 模拟考试标题
/// - `total`: 题目总数
/// - `time_limit_minutes`: 时间限制（分钟）
pub fn log_session_loaded(title: &str, total: usize, time_limit_minutes: u64) {
    info!("✓ 已加载模拟考试: {}", truncate_text(title, 60));
    info!("📋 共 {} 道题，限时 {} 分钟", total, time_limit_minutes);
}

/// 记录提交结果
pub fn log_submit_result(session_id: &str, outcome: &SubmitOutcome) {
    info!("\n{}", "─".repeat(60));
    match outcome {
        SubmitOutcome::Confirmed(ack) => {
            info!(
                "✅ [模拟考试 {}] 提交成功: 得分 {}% ({}/{})",
                session_id, ack.score, ack.correct_count, ack.total_count
            );
        }
        SubmitOutcome::SavedLocally { error, path } => {
            warn!(
                "⚠️ [模拟考试 {}] 提交可能尚未确认 ({}), 作答已保存到本地: {}",
                session_id, error, path
            );
        }
        SubmitOutcome::Ignored => {
            info!("[模拟考试 {}] 已在提交中或已提交，忽略重复触发", session_id);
        }
    }
    info!("{}", "─".repeat(60));
}

/// 打印各科目统计
pub fn log_breakdown(breakdown: &SubjectBreakdown) {
    for (subject, score) in breakdown.iter() {
        info!(
            "  📚 {}: {}/{} ({}%)",
            subject,
            score.correct,
            score.total,
            score.percent()
        );
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars_not_bytes() {
        assert_eq!(truncate_text("Constituição", 5), "Const...");
        assert_eq!(truncate_text("ação", 4), "ação");
    }
}
