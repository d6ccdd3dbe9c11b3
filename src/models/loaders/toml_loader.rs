use crate::error::{AppResult, ExamError};
use crate::models::question::SessionDefinition;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载离线模拟考试
///
/// 文件格式与后端返回一致：
///
/// ```toml
/// id = "local-1"
/// title = "Simulado CESPE"
/// time_limit = 60
///
/// [[questions]]
/// id = 1
/// text = "..."
/// options = ["...", "..."]
/// correct_answer = 1
/// subject = "Direito Constitucional"
/// ```
pub async fn load_session_file(path: &Path) -> AppResult<SessionDefinition> {
    let session_id = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let content = fs::read_to_string(path).await.map_err(|e| {
        ExamError::session_load(&session_id, format!("无法读取文件 {}: {}", path.display(), e))
    })?;

    let definition: SessionDefinition = toml::from_str(&content).map_err(|e| {
        ExamError::session_load(&session_id, format!("无法解析文件 {}: {}", path.display(), e))
    })?;

    tracing::info!(
        "正在加载: {} ({} 道题)",
        path.file_name().unwrap_or_default().to_string_lossy(),
        definition.questions.len()
    );

    Ok(definition)
}
