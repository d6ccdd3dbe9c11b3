/// 把会话ID转换为安全的文件名片段
///
/// 只保留 ASCII 字母数字、`-` 与 `_`，其余字符替换为 `_`，
/// 保证拼接后的路径不会离开目标目录
pub fn safe_file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
