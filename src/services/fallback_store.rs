//! 本地兜底存储 - 业务能力层
//!
//! 只负责"把一次作答落盘/读回"，不关心提交流程

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppResult, ExamError};
use crate::utils::safe_file_stem;

/// 兜底记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackRecord {
    pub session_id: String,
    pub answers: BTreeMap<String, usize>,
    pub elapsed_seconds: u64,
    pub completed_at: DateTime<Utc>,
}

impl FallbackRecord {
    pub fn new(
        session_id: impl Into<String>,
        answers: BTreeMap<String, usize>,
        elapsed_seconds: u64,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            answers,
            elapsed_seconds,
            completed_at: Utc::now(),
        }
    }
}

/// 兜底记录的存储键
pub fn fallback_key(session_id: &str) -> String {
    format!("session_{}", safe_file_stem(session_id))
}

/// 本地持久化存储
#[async_trait]
pub trait FallbackStore: Send + Sync {
    /// 写入记录，返回存储位置（用于提示用户）
    async fn persist(&self, record: &FallbackRecord) -> AppResult<String>;

    /// 读取记录，不存在时返回 None
    async fn load(&self, session_id: &str) -> AppResult<Option<FallbackRecord>>;
}

/// 文件兜底存储
///
/// 职责：
/// - 每个会话一个 `<dir>/session_<id>.json`
/// - 先写临时文件再改名，不会留下半个文件
/// - 同一会话重复写入时覆盖
pub struct FileFallbackStore {
    dir: PathBuf,
}

impl FileFallbackStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", fallback_key(session_id)))
    }
}

#[async_trait]
impl FallbackStore for FileFallbackStore {
    async fn persist(&self, record: &FallbackRecord) -> AppResult<String> {
        let path = self.path_for(&record.session_id);
        let path_str = path.display().to_string();
        debug!(
            "写入兜底记录: 会话 {} | {} 道作答 | 用时 {} 秒",
            record.session_id,
            record.answers.len(),
            record.elapsed_seconds
        );

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ExamError::storage(self.dir.display().to_string(), e))?;

        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| ExamError::storage(&path_str, e))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| ExamError::storage(tmp.display().to_string(), e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| ExamError::storage(&path_str, e))?;

        info!("💾 作答已保存到本地: {}", path_str);
        Ok(path_str)
    }

    async fn load(&self, session_id: &str) -> AppResult<Option<FallbackRecord>> {
        let path = self.path_for(session_id);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ExamError::storage(path.display().to_string(), e)),
        };

        let record = serde_json::from_slice(&content)
            .map_err(|e| ExamError::storage(path.display().to_string(), e))?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(session_id: &str) -> FallbackRecord {
        let mut answers = BTreeMap::new();
        answers.insert("q1".to_string(), 2);
        FallbackRecord::new(session_id, answers, 60)
    }

    #[test]
    fn test_key_is_prefixed_and_sanitized() {
        assert_eq!(fallback_key("12"), "session_12");
        assert_eq!(fallback_key("../etc/x"), "session____etc_x");
    }

    #[test]
    fn test_record_uses_camel_case_fields() {
        let json = serde_json::to_value(record("12")).unwrap();
        assert_eq!(json["sessionId"], "12");
        assert_eq!(json["elapsedSeconds"], 60);
        assert_eq!(json["answers"]["q1"], 2);
        assert!(json["completedAt"].as_str().unwrap().contains('T'));
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFallbackStore::new(dir.path().join("nested"));
        let original = record("12");

        let path = store.persist(&original).await.unwrap();
        assert!(path.ends_with("session_12.json"));
        assert!(!dir.path().join("nested/session_12.json.tmp").exists());

        let loaded = store.load("12").await.unwrap();
        assert_eq!(loaded, Some(original));
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFallbackStore::new(dir.path());
        assert_eq!(store.load("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("session_9.json"), b"{not json").unwrap();
        let store = FileFallbackStore::new(dir.path());

        let err = store.load("9").await.unwrap_err();
        assert!(matches!(err, ExamError::Storage { .. }));
    }
}
