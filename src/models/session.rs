//! 单次模拟考试作答的状态机
//!
//! ```text
//! InProgress ──submit──▶ Submitting ──成功──▶ Submitted
//!     ▲                      │
//!     │ resume               └──失败──▶ Failed ──兜底已保存──▶ SubmittedLocally
//!     └──────────────────────────────────┘  └──────retry (submit)──────┘
//! ```
//!
//! 所有方法都是同步的，由上层在锁内调用。

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::{AnswerStore, Question, SubjectBreakdown};
use crate::error::{AppResult, ExamError};

/// 提交状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionState {
    InProgress,
    Submitting,
    Submitted,
    Failed,
    /// 远程未确认，但作答已写入本地兜底
    SubmittedLocally,
}

impl SubmissionState {
    /// 作答结束（计时已停，作答已冻结）
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionState::Submitted | SubmissionState::SubmittedLocally
        )
    }

    /// 是否可以（重新）发起提交
    pub fn accepts_submit(self) -> bool {
        matches!(
            self,
            SubmissionState::InProgress | SubmissionState::Failed | SubmissionState::SubmittedLocally
        )
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionState::InProgress => "InProgress",
            SubmissionState::Submitting => "Submitting",
            SubmissionState::Submitted => "Submitted",
            SubmissionState::Failed => "Failed",
            SubmissionState::SubmittedLocally => "SubmittedLocally",
        };
        f.write_str(name)
    }
}

/// 翻题方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// 进入 Submitting 时冻结的提交内容
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    pub session_id: String,
    pub answers: BTreeMap<String, usize>,
    pub elapsed_seconds: u64,
    pub breakdown: SubjectBreakdown,
}

/// 只读快照，供展示层使用
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: SubmissionState,
    pub current_index: usize,
    pub total_questions: usize,
    pub answered: usize,
    pub remaining_seconds: u64,
    pub time_limit_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct ExamSession {
    id: String,
    questions: Vec<Question>,
    time_limit_seconds: u64,
    answers: AnswerStore,
    current_index: usize,
    remaining_seconds: u64,
    state: SubmissionState,
}

impl ExamSession {
    /// 创建新会话
    ///
    /// # 参数
    /// - `id`: 会话ID
    /// - `questions`: 题目列表（创建后固定）
    /// - `time_limit_seconds`: 时间限制（秒），必须为正
    pub fn new(
        id: impl Into<String>,
        questions: Vec<Question>,
        time_limit_seconds: i64,
    ) -> AppResult<Self> {
        if questions.is_empty() {
            return Err(ExamError::invalid_configuration("题目列表为空"));
        }
        if time_limit_seconds <= 0 {
            return Err(ExamError::invalid_configuration(format!(
                "时间限制必须大于 0 秒，实际 {}",
                time_limit_seconds
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for question in &questions {
            question.validate().map_err(ExamError::invalid_configuration)?;
            if !seen.insert(question.id.as_str()) {
                return Err(ExamError::invalid_configuration(format!(
                    "题目ID重复: {}",
                    question.id
                )));
            }
        }

        let time_limit_seconds = time_limit_seconds as u64;
        Ok(Self {
            id: id.into(),
            questions,
            time_limit_seconds,
            answers: AnswerStore::new(),
            current_index: 0,
            remaining_seconds: time_limit_seconds,
            state: SubmissionState::InProgress,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn time_limit_seconds(&self) -> u64 {
        self.time_limit_seconds
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.time_limit_seconds - self.remaining_seconds
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            state: self.state,
            current_index: self.current_index,
            total_questions: self.questions.len(),
            answered: self.answers.count(),
            remaining_seconds: self.remaining_seconds,
            time_limit_seconds: self.time_limit_seconds,
        }
    }

    fn ensure_in_progress(&self, operation: &'static str) -> AppResult<()> {
        if self.state == SubmissionState::InProgress {
            Ok(())
        } else {
            Err(ExamError::invalid_state(operation, self.state))
        }
    }

    /// 记录或覆盖作答，不移动当前题目
    pub fn select_answer(&mut self, question_id: &str, option_index: usize) -> AppResult<()> {
        self.ensure_in_progress("select_answer")?;

        let question = self
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .filter(|q| option_index < q.options.len())
            .ok_or_else(|| ExamError::InvalidAnswer {
                question_id: question_id.to_string(),
                option_index,
            })?;

        self.answers.set(question.id.clone(), option_index);
        Ok(())
    }

    /// 前后翻题，在边界处保持不动
    pub fn advance(&mut self, direction: Direction) -> AppResult<usize> {
        self.ensure_in_progress("advance")?;
        self.current_index = match direction {
            Direction::Next => (self.current_index + 1).min(self.questions.len() - 1),
            Direction::Previous => self.current_index.saturating_sub(1),
        };
        Ok(self.current_index)
    }

    /// 跳转到指定题目，越界时夹到最后一题
    pub fn go_to(&mut self, index: usize) -> AppResult<usize> {
        self.ensure_in_progress("go_to")?;
        self.current_index = index.min(self.questions.len() - 1);
        Ok(self.current_index)
    }

    /// 同步倒计时的剩余秒数，只接受更小的值
    pub fn sync_remaining(&mut self, remaining_seconds: u64) -> bool {
        if self.state != SubmissionState::InProgress || remaining_seconds >= self.remaining_seconds {
            return false;
        }
        self.remaining_seconds = remaining_seconds;
        true
    }

    /// 进入 Submitting 并冻结提交内容
    ///
    /// 已在提交中或已提交时返回 None
    pub fn begin_submission(&mut self) -> Option<SubmissionTicket> {
        if !self.state.accepts_submit() {
            return None;
        }
        self.state = SubmissionState::Submitting;
        Some(SubmissionTicket {
            session_id: self.id.clone(),
            answers: self.answers.to_map(),
            elapsed_seconds: self.elapsed_seconds(),
            breakdown: SubjectBreakdown::compute(&self.questions, &self.answers),
        })
    }

    /// 远程提交结束
    pub fn finish_submission(&mut self, confirmed: bool) -> AppResult<()> {
        if self.state != SubmissionState::Submitting {
            return Err(ExamError::invalid_state("finish_submission", self.state));
        }
        self.state = if confirmed {
            SubmissionState::Submitted
        } else {
            SubmissionState::Failed
        };
        Ok(())
    }

    /// 兜底文件已写入
    pub fn mark_saved_locally(&mut self) -> AppResult<()> {
        if self.state != SubmissionState::Failed {
            return Err(ExamError::invalid_state("mark_saved_locally", self.state));
        }
        self.state = SubmissionState::SubmittedLocally;
        Ok(())
    }

    /// 提交失败后继续作答
    pub fn resume(&mut self) -> AppResult<()> {
        if self.state != SubmissionState::Failed || self.remaining_seconds == 0 {
            return Err(ExamError::invalid_state("resume", self.state));
        }
        self.state = SubmissionState::InProgress;
        Ok(())
    }
}
