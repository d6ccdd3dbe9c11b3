//! 离线题目来源
//!
//! 从目录中的 `<session_id>.toml` 读取模拟考试，或直接绑定单个文件

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::QuestionSource;
use crate::error::AppResult;
use crate::models::{load_session_file, SessionDefinition};
use crate::utils::safe_file_stem;

pub struct FileQuestionSource {
    location: Location,
}

enum Location {
    Dir(PathBuf),
    File(PathBuf),
}

impl FileQuestionSource {
    /// 按会话ID在目录中查找 `<id>.toml`
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::Dir(dir.into()),
        }
    }

    /// 无论会话ID是什么都读取同一个文件
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
        }
    }
}

#[async_trait]
impl QuestionSource for FileQuestionSource {
    async fn get_session(&self, session_id: &str) -> AppResult<SessionDefinition> {
        let path = match &self.location {
            Location::Dir(dir) => {
                dir.join(format!("{}.toml", safe_file_stem(session_id)))
            }
            Location::File(path) => path.clone(),
        };
        debug!("从本地文件读取模拟考试: {}", path.display());
        load_session_file(&path).await
    }
}
