//! 终端命令解析

use crate::clients::SimuladoConfig;

/// 终端输入的一条命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    /// 跳到第 k 题（内部已转换为 0 起始）
    GoTo(usize),
    /// 回答当前题目（内部已转换为 0 起始的选项索引）
    Answer(usize),
    Submit,
    Resume,
    Quit,
}

impl Command {
    /// 解析一行输入
    ///
    /// - `n` / `p`：下一题 / 上一题
    /// - `g <k>`：跳到第 k 题（从 1 开始）
    /// - `a <k>`：选择选项，k 可以是字母 A-Z 或从 1 开始的数字
    /// - `s` 提交，`r` 继续作答，`q` 退出
    ///
    /// # 返回
    /// 无法识别时返回 None
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let head = parts.next()?.to_ascii_lowercase();
        let arg = parts.next();
        if parts.next().is_some() {
            return None;
        }

        match (head.as_str(), arg) {
            ("n", None) => Some(Command::Next),
            ("p", None) => Some(Command::Previous),
            ("s", None) => Some(Command::Submit),
            ("r", None) => Some(Command::Resume),
            ("q", None) => Some(Command::Quit),
            ("g", Some(k)) => parse_one_based(k).map(Command::GoTo),
            ("a", Some(k)) => parse_option(k).map(Command::Answer),
            _ => None,
        }
    }
}

/// 解析 `create` 子命令参数：`<banca> <题数> <分钟> <科目,科目...>`
pub fn parse_create_args(args: &[String]) -> Option<SimuladoConfig> {
    let [banca, num_questions, time_limit, subjects] = args else {
        return None;
    };
    let num_questions = num_questions.parse::<u32>().ok().filter(|n| *n > 0)?;
    let time_limit = time_limit.parse::<u32>().ok().filter(|m| *m > 0)?;
    let subjects: Vec<String> = subjects
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if subjects.is_empty() {
        return None;
    }

    Some(SimuladoConfig {
        title: format!("Simulado {} - {}", banca, subjects.join(", ")),
        banca: banca.clone(),
        subjects,
        num_questions,
        time_limit,
        level: "medio".to_string(),
    })
}

fn parse_one_based(value: &str) -> Option<usize> {
    value.parse::<usize>().ok()?.checked_sub(1)
}

fn parse_option(value: &str) -> Option<usize> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => parse_one_based(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("n"), Some(Command::Next));
        assert_eq!(Command::parse("  P "), Some(Command::Previous));
        assert_eq!(Command::parse("s"), Some(Command::Submit));
        assert_eq!(Command::parse("r"), Some(Command::Resume));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
    }

    #[test]
    fn test_parse_arguments_are_one_based() {
        assert_eq!(Command::parse("g 3"), Some(Command::GoTo(2)));
        assert_eq!(Command::parse("a 1"), Some(Command::Answer(0)));
        assert_eq!(Command::parse("a c"), Some(Command::Answer(2)));
        assert_eq!(Command::parse("a B"), Some(Command::Answer(1)));
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_create_args() {
        let config = parse_create_args(&args(&[
            "CESPE",
            "20",
            "60",
            "Português, Direito Constitucional",
        ]))
        .unwrap();
        assert_eq!(config.banca, "CESPE");
        assert_eq!(config.num_questions, 20);
        assert_eq!(config.time_limit, 60);
        assert_eq!(config.subjects, vec!["Português", "Direito Constitucional"]);
        assert!(config.title.contains("CESPE"));

        assert!(parse_create_args(&args(&["CESPE", "0", "60", "Português"])).is_none());
        assert!(parse_create_args(&args(&["CESPE", "20", "60", " , "])).is_none());
        assert!(parse_create_args(&args(&["CESPE", "20"])).is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("g"), None);
        assert_eq!(Command::parse("g 0"), None);
        assert_eq!(Command::parse("a é"), None);
        assert_eq!(Command::parse("n 2"), None);
        assert_eq!(Command::parse("x"), None);
    }
}
