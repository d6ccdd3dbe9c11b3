use std::collections::{BTreeMap, HashMap};

/// 作答存储：题目ID → 所选选项索引
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    answers: HashMap<String, usize>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录或覆盖作答
    pub fn set(&mut self, question_id: impl Into<String>, option_index: usize) {
        self.answers.insert(question_id.into(), option_index);
    }

    pub fn get(&self, question_id: &str) -> Option<usize> {
        self.answers.get(question_id).copied()
    }

    /// 已作答的不同题目数
    pub fn count(&self) -> usize {
        self.answers.len()
    }

    /// 提交用的有序快照
    pub fn to_map(&self) -> BTreeMap<String, usize> {
        self.answers
            .iter()
            .map(|(id, option)| (id.clone(), *option))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_latest_value() {
        let mut store = AnswerStore::new();
        store.set("q1", 0);
        store.set("q2", 3);
        store.set("q1", 2);

        assert_eq!(store.get("q1"), Some(2));
        assert_eq!(store.get("q2"), Some(3));
        assert_eq!(store.get("q3"), None);
    }

    #[test]
    fn test_count_never_exceeds_distinct_ids() {
        let mut store = AnswerStore::new();
        let ids = ["a", "b", "a", "c", "b", "a", "a"];
        let mut seen = std::collections::HashSet::new();

        for (i, id) in ids.iter().enumerate() {
            store.set(*id, i % 4);
            seen.insert(*id);
            assert!(store.count() <= seen.len());
        }
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_to_map_is_a_snapshot() {
        let mut store = AnswerStore::new();
        store.set("2", 1);
        store.set("1", 0);
        let snapshot = store.to_map();
        store.set("1", 3);

        assert_eq!(snapshot.keys().cloned().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(snapshot["1"], 0);
    }
}
