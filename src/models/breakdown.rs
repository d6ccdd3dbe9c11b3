use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AnswerStore, Question};

/// 单科统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub correct: u32,
    pub total: u32,
}

impl SubjectScore {
    pub fn percent(&self) -> u32 {
        score_percent(self.correct, self.total)
    }
}

/// 按科目统计（提交时作为 `subject_scores` 发送）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectBreakdown(BTreeMap<String, SubjectScore>);

impl SubjectBreakdown {
    /// 根据题目与作答计算各科正确数，未作答计为错误
    pub fn compute(questions: &[Question], answers: &AnswerStore) -> Self {
        let mut scores: BTreeMap<String, SubjectScore> = BTreeMap::new();
        for question in questions {
            let entry = scores.entry(question.subject.clone()).or_default();
            entry.total += 1;
            if answers
                .get(&question.id)
                .is_some_and(|option| question.is_correct(option))
            {
                entry.correct += 1;
            }
        }
        Self(scores)
    }

    pub fn get(&self, subject: &str) -> Option<&SubjectScore> {
        self.0.get(subject)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SubjectScore)> {
        self.0.iter()
    }

    pub fn correct_count(&self) -> u32 {
        self.0.values().map(|s| s.correct).sum()
    }

    pub fn total_count(&self) -> u32 {
        self.0.values().map(|s| s.total).sum()
    }

    pub fn score_percent(&self) -> u32 {
        score_percent(self.correct_count(), self.total_count())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 百分比得分，向下取整
pub fn score_percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        correct * 100 / total
    }
}
