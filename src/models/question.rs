use serde::{Deserialize, Serialize};

/// 单道选择题，加载后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 后端返回整数 ID，统一转换为字符串
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(alias = "question")]
    pub text: String,
    pub options: Vec<String>,
    #[serde(alias = "correctAnswer")]
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub subject: String,
}

impl Question {
    /// 检查题目本身是否合法
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("题目ID不能为空".to_string());
        }
        if self.options.len() < 2 {
            return Err(format!(
                "题目 {} 至少需要 2 个选项，实际 {} 个",
                self.id,
                self.options.len()
            ));
        }
        if self.correct_answer >= self.options.len() {
            return Err(format!(
                "题目 {} 的正确答案索引 {} 超出范围 [0, {}]",
                self.id,
                self.correct_answer,
                self.options.len() - 1
            ));
        }
        Ok(())
    }

    pub fn is_correct(&self, option_index: usize) -> bool {
        self.correct_answer == option_index
    }
}

/// 题目来源返回的模拟考试定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDefinition {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// 时间限制（分钟）
    #[serde(alias = "timeLimit")]
    pub time_limit: u64,
    pub questions: Vec<Question>,
}

impl SessionDefinition {
    pub fn time_limit_seconds(&self) -> u64 {
        self.time_limit.saturating_mul(60)
    }
}

// 后端 ID 可能是字符串也可能是整数
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer identifier")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_payload_with_integer_ids() {
        let json = r#"{
            "id": 12,
            "title": "Simulado CESPE - Direito Constitucional",
            "time_limit": 60,
            "total_questions": 1,
            "questions": [{
                "id": 301,
                "text": "A respeito dos direitos fundamentais, assinale a opção correta.",
                "options": ["absolutos", "restringíveis por lei"],
                "correct_answer": 1,
                "subject": "Direito Constitucional",
                "banca": "CESPE",
                "level": "medio"
            }]
        }"#;

        let def: SessionDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.id, "12");
        assert_eq!(def.time_limit_seconds(), 3600);
        assert_eq!(def.questions[0].id, "301");
        assert!(def.questions[0].explanation.is_none());
        assert!(def.questions[0].is_correct(1));
    }

    #[test]
    fn test_validate_rejects_single_option() {
        let q = Question {
            id: "1".to_string(),
            text: "?".to_string(),
            options: vec!["só uma".to_string()],
            correct_answer: 0,
            explanation: None,
            subject: "Português".to_string(),
        };
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_correct_index_out_of_range() {
        let q = Question {
            id: "1".to_string(),
            text: "?".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_answer: 2,
            explanation: None,
            subject: "Português".to_string(),
        };
        let err = q.validate().unwrap_err();
        assert!(err.contains("超出范围"));
    }
}
