//! 盘上字符串统一使用单字节编码 (ISO-8859-1)：每个字节即同值的码位。

/// 解码定长字段，并去掉尾部填充的空格。
pub fn decode_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| char::from(b))
        .collect::<String>()
        .trim_end_matches(' ')
        .to_owned()
}

/// 编码为单字节序列。
/// 若存在码位超出`0xFF`的字符，返回`None`。
pub fn encode_text(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(c).ok()).collect()
}

/// 编码并以空格填充至`width`字节，超长则返回`None`。
pub(crate) fn encode_padded(text: &str, width: usize) -> Option<Vec<u8>> {
    let mut bytes = encode_text(text)?;
    if bytes.len() > width {
        return None;
    }
    bytes.resize(width, b' ');
    Some(bytes)
}
