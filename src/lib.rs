//! # Simulado Runner
//!
//! 一个用于限时模拟考试作答与提交的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有计时任务，只暴露能力
//! - `CountdownTimer` - 唯一的 tick 任务，提供启动 / 取消能力
//!
//! ### ② 客户端（Clients）
//! - `clients/` - 外部服务的契约与实现
//! - `QuestionSource` / `ScoringEndpoint` - 取题与评分接口
//! - `BackendClient` - 模拟考试后端（HTTP）
//! - `FileQuestionSource` - 离线 TOML 试题
//! - `AnalysisClient` - 公告分析服务
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不持有会话状态
//! - `SubmissionGateway` - 一次远程提交 + 本地兜底
//! - `FileFallbackStore` - 写 `session_<id>.json` 能力
//!
//! ### ④ 数据模型（Models）
//! - `ExamSession` - 作答状态机（InProgress → Submitting → Submitted / Failed / SubmittedLocally）
//! - `AnswerStore` / `SubjectBreakdown` - 作答与科目统计
//!
//! ### ⑤ 流程层（Workflow）
//! - `ExamSessionController` - 编排"一次模拟考试"：计时、作答、提交、兜底
//!
//! ### ⑥ 编排层（Orchestration）
//! - `orchestrator/app` - 终端命令驱动单次作答、查看兜底、公告分析

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppResult, ExamError, SubmissionError};
pub use models::{ExamSession, Question, SessionDefinition, SubmissionState};
pub use orchestrator::App;
pub use services::{SubmissionGateway, SubmitOutcome};
pub use workflow::ExamSessionController;
