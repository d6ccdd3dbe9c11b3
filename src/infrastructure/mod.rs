//! 基础设施层
//!
//! 持有稀缺资源（计时任务），只暴露能力，不认识题目和作答

pub mod countdown;

pub use countdown::{CountdownTimer, TimerHandle};
