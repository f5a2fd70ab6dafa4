/// 文本编码与行切分
///
/// 脚本文件以项目配置的编码读写。为了逐字节还原：
/// - BOM 不剥离，作为 U+FEFF 保留在文本开头，由解析器拆为单独的结构条目
/// - 切行时保留每行原有的换行符
use encoding_rs::Encoding;

use crate::utils::{Result, SekaiError};

/// 常见但不属于 WHATWG 标签集的编码别名
const ENCODING_ALIASES: &[(&str, &str)] = &[
    ("cp932", "windows-31j"),
    ("ms932", "windows-31j"),
    ("sjis", "shift_jis"),
    ("utf8", "utf-8"),
    ("utf-8-sig", "utf-8"),
    ("cp936", "gbk"),
];

/// 解析编码标签
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let lowered = label.trim().to_lowercase();
    let canonical = ENCODING_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, target)| *target)
        .unwrap_or(lowered.as_str());

    Encoding::for_label(canonical.as_bytes())
        .ok_or_else(|| SekaiError::UnknownEncoding(label.to_string()))
}

/// 解码字节，无法解码的字节替换为 U+FFFD
///
/// # 返回
/// `(文本, 是否发生替换)`
pub fn decode(bytes: &[u8], label: &str) -> Result<(String, bool)> {
    let encoding = resolve_encoding(label)?;
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::warn!("按 {} 解码时存在无法识别的字节，已替换为 U+FFFD", encoding.name());
    }
    Ok((text.into_owned(), had_errors))
}

/// 编码文本
///
/// encoding_rs 不提供 UTF-16 编码器，UTF-16LE/BE 在此手动处理。
/// 目标编码无法表示的字符返回 [`SekaiError::Unencodable`]，不写出数字字符引用。
pub fn encode(text: &str, label: &str) -> Result<Vec<u8>> {
    let encoding = resolve_encoding(label)?;

    if encoding == encoding_rs::UTF_16LE {
        return Ok(text.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect());
    }
    if encoding == encoding_rs::UTF_16BE {
        return Ok(text.encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect());
    }

    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        let mut buf = [0u8; 4];
        let character = text
            .chars()
            .find(|c| encoding.encode(c.encode_utf8(&mut buf)).2)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        tracing::warn!("字符 {:?} 无法以 {} 编码", character, encoding.name());
        return Err(SekaiError::Unencodable {
            encoding: encoding.name().to_string(),
            character,
        });
    }
    Ok(bytes.into_owned())
}

/// 一个物理行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLine<'a> {
    /// 行号（从 1 开始）
    pub number: usize,
    /// 不含换行符的内容
    pub content: &'a str,
    /// 原换行符：`"\n"`、`"\r\n"` 或空（末行无换行）
    pub eol: &'a str,
}

/// 按 `\n` 切行并保留换行符
///
/// 文本以换行结尾时不会产生多余的空末行。
pub fn split_lines(text: &str) -> Vec<ScriptLine<'_>> {
    let mut lines = Vec::new();
    let mut rest = text;
    let mut number = 1;

    while !rest.is_empty() {
        let (line, remainder) = match rest.find('\n') {
            Some(pos) => (&rest[..=pos], &rest[pos + 1..]),
            None => (rest, ""),
        };

        let (content, eol) = if let Some(stripped) = line.strip_suffix("\r\n") {
            (stripped, "\r\n")
        } else if let Some(stripped) = line.strip_suffix('\n') {
            (stripped, "\n")
        } else {
            (line, "")
        };

        lines.push(ScriptLine { number, content, eol });
        number += 1;
        rest = remainder;
    }

    lines
}
