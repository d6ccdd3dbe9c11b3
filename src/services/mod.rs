//! 业务能力层
//!
//! - `submission_gateway`：一次远程提交 + 本地兜底
//! - `fallback_store`：兜底记录的持久化

pub mod fallback_store;
pub mod submission_gateway;

pub use fallback_store::{fallback_key, FallbackRecord, FallbackStore, FileFallbackStore};
pub use submission_gateway::{SubmissionGateway, SubmitOutcome};
