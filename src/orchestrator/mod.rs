//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责把终端输入翻译成会话操作，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 选择题目来源（后端或离线文件）
//! - 用 `tokio::select!` 同时等待终端输入和会话状态变化
//! - 输出提交结果与科目统计
//! - 查询结果、生成模拟考试、公告分析
//!
//! ### `command` - 命令解析
//! - 把一行输入解析为 `Command`
//! - 解析 `create` 子命令参数
//!
//! ## 层次关系
//!
//! ```text
//! app (终端命令)
//!     ↓
//! workflow::ExamSessionController (单次作答)
//!     ↓
//! services (能力层：提交网关 / 本地兜底)
//!     ↓
//! infrastructure (基础设施：CountdownTimer)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services → infrastructure
//! 2. **无业务逻辑**：只做调度和输出，不做具体业务判断
//! 3. **错误分级**：时序错误只记 debug，加载/提交错误提示可重试

pub mod app;
pub mod command;

pub use app::App;
pub use command::{parse_create_args, Command};
