//! 数据模型
//!
//! - `question`：题目与模拟考试定义（来自后端或离线 TOML）
//! - `session`：单次作答的状态机
//! - `answer_store`：题目 → 选项 的作答映射
//! - `breakdown`：按科目统计正确数
//! - `edital`：公告分析接口的请求/响应

pub mod answer_store;
pub mod breakdown;
pub mod edital;
pub mod loaders;
pub mod question;
pub mod session;

pub use answer_store::AnswerStore;
pub use breakdown::{SubjectBreakdown, SubjectScore};
pub use loaders::load_session_file;
pub use question::{Question, SessionDefinition};
pub use session::{Direction, ExamSession, SessionSnapshot, SubmissionState, SubmissionTicket};
