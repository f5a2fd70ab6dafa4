/// Siglus 文本导出解析器（`.txt`）
///
/// 每条记录两行，同一句话存两次：
///
/// ```text
/// ○001○"こんにちは"
/// ●001●"こんにちは"
/// ```
///
/// 只有带引号（`"…"` 或 `“…”`）的记录被视为可翻译台词，
/// 重建时把译文同时写入两行。
use std::path::Path;

use super::{context_mismatch, has_extension, split_bom, write_structural, ScriptParser};
use crate::entry::{EntryContext, TranslationEntry};
use crate::io::{split_lines, ScriptLine};
use crate::utils::Result;

pub const ENGINE_NAME: &str = "siglus";

const MARKER_A: char = '○';
const MARKER_B: char = '●';
const QUOTE_PAIRS: &[(char, char)] = &[('“', '”'), ('"', '"')];

#[derive(Debug, Clone, Default)]
pub struct SiglusParser {
    language: Option<String>,
}

impl SiglusParser {
    pub fn new() -> Self {
        Self::default()
    }
}

/// 第二个标记字符之后的字节位置（即 ID 字段结束处）
fn id_field_end(content: &str, marker: char) -> Option<usize> {
    let width = marker.len_utf8();
    let rest = content.strip_prefix(marker)?;
    rest.find(marker).map(|pos| width + pos + width)
}

/// ID 字段之后带引号的文本位置
#[derive(Debug, Clone, Copy)]
struct QuotedSpan {
    text_start: usize,
    text_end: usize,
}

fn quoted_span(content: &str, from: usize) -> Option<QuotedSpan> {
    let rest = &content[from..];
    let trimmed = rest.trim();
    let lead = rest.len() - rest.trim_start().len();

    QUOTE_PAIRS.iter().find_map(|&(open, close)| {
        let inner = trimmed.strip_prefix(open)?.strip_suffix(close)?;
        let text_start = from + lead + open.len_utf8();
        Some(QuotedSpan {
            text_start,
            text_end: text_start + inner.len(),
        })
    })
}

fn raw_entry(line: &ScriptLine<'_>) -> TranslationEntry {
    TranslationEntry::structural(
        format!("raw-{}", line.number),
        line.content,
        line.number,
        line.eol,
    )
}

/// 尝试把两行组成一条可翻译记录
///
/// 返回 `Err(消耗行数)` 表示不是可翻译记录：
/// 1 表示只输出第一行结构条目，2 表示两行都作为结构条目输出。
fn pair_entry(
    index: usize,
    a: &ScriptLine<'_>,
    b: &ScriptLine<'_>,
) -> std::result::Result<TranslationEntry, usize> {
    if !(a.content.starts_with(MARKER_A) && b.content.starts_with(MARKER_B)) {
        return Err(1);
    }
    let id_end_a = id_field_end(a.content, MARKER_A).ok_or(1usize)?;
    let id_end_b = id_field_end(b.content, MARKER_B).ok_or(1usize)?;

    let span_a = quoted_span(a.content, id_end_a).ok_or(2usize)?;
    let text = &a.content[span_a.text_start..span_a.text_end];
    if text.trim().is_empty() {
        return Err(2);
    }

    let prefix_a = &a.content[..span_a.text_start];
    let suffix_a = &a.content[span_a.text_end..];

    // 第二行自身带引号时使用自己的前后缀，否则沿用第一行的引号与后缀
    let (prefix_b, suffix_b) = match quoted_span(b.content, id_end_b) {
        Some(span_b) => (
            b.content[..span_b.text_start].to_string(),
            b.content[span_b.text_end..].to_string(),
        ),
        None => (
            format!("{}{}", &b.content[..id_end_b], &a.content[id_end_a..span_a.text_start]),
            suffix_a.to_string(),
        ),
    };

    Ok(TranslationEntry::new(
        index.to_string(),
        text.to_string(),
        EntryContext::Paired {
            raw_line_a: a.content.to_string(),
            raw_line_b: b.content.to_string(),
            prefix_a: prefix_a.to_string(),
            prefix_b,
            suffix_a: suffix_a.to_string(),
            suffix_b,
            line_number: a.number,
            eol_a: a.eol.to_string(),
            eol_b: b.eol.to_string(),
        },
    ))
}

impl ScriptParser for SiglusParser {
    fn engine_name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn can_parse(&self, path: &Path) -> bool {
        has_extension(path, &["txt"])
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn set_language(&mut self, language: &str) {
        self.language = Some(language.to_string());
    }

    fn parse_text(&self, text: &str) -> Result<Vec<TranslationEntry>> {
        let (mut entries, body) = split_bom(text);
        let lines = split_lines(body);
        let mut i = 0;

        while i + 1 < lines.len() {
            match pair_entry(i, &lines[i], &lines[i + 1]) {
                Ok(entry) => {
                    entries.push(entry);
                    i += 2;
                }
                Err(consumed) => {
                    for line in &lines[i..i + consumed] {
                        entries.push(raw_entry(line));
                    }
                    i += consumed;
                }
            }
        }

        // 落单的末行
        if let Some(line) = lines.get(i) {
            entries.push(raw_entry(line));
        }

        Ok(entries)
    }

    fn rebuild_text(&self, entries: &[TranslationEntry]) -> Result<String> {
        let mut output = String::new();

        for entry in entries {
            if write_structural(&mut output, entry) {
                continue;
            }
            match &entry.context {
                EntryContext::Paired {
                    raw_line_a,
                    raw_line_b,
                    prefix_a,
                    prefix_b,
                    suffix_a,
                    suffix_b,
                    eol_a,
                    eol_b,
                    ..
                } => {
                    if entry.translation.is_empty() {
                        output.push_str(raw_line_a);
                        output.push_str(eol_a);
                        output.push_str(raw_line_b);
                        output.push_str(eol_b);
                    } else {
                        let text = &entry.translation;
                        output.push_str(&format!("{}{}{}{}", prefix_a, text, suffix_a, eol_a));
                        output.push_str(&format!("{}{}{}{}", prefix_b, text, suffix_b, eol_b));
                    }
                }
                _ => return Err(context_mismatch(entry, "paired")),
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_pair_is_translatable() {
        let parser = SiglusParser::new();
        let entries = parser.parse_text("○001○\"Hi\"\n●001●\"Hi\"\n").unwrap();

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.entry_id, "0");
        assert_eq!(entry.original, "Hi");
        assert_eq!(entry.context.prefix(), "○001○\"");
        assert_eq!(entry.context.suffix(), "\"");
        assert_eq!(entry.context.line_number(), 1);
    }

    #[test]
    fn test_rebuild_writes_both_lines() {
        let parser = SiglusParser::new();
        let mut entries = parser.parse_text("○001○\"Hi\"\n●001●\"Hi\"\n").unwrap();
        entries[0].translation = "Oi".to_string();

        let rebuilt = parser.rebuild_text(&entries).unwrap();
        assert_eq!(rebuilt, "○001○\"Oi\"\n●001●\"Oi\"\n");
    }

    #[test]
    fn test_bom_does_not_hide_first_record() {
        let parser = SiglusParser::new();
        let mut entries = parser.parse_text("\u{FEFF}○001○\"Hi\"\n●001●\"Hi\"\n").unwrap();

        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_translatable());
        assert_eq!(entries[1].entry_id, "0");
        assert_eq!(entries[1].original, "Hi");

        entries[1].translation = "Oi".to_string();
        let rebuilt = parser.rebuild_text(&entries).unwrap();
        assert_eq!(rebuilt, "\u{FEFF}○001○\"Oi\"\n●001●\"Oi\"\n");
    }

    #[test]
    fn test_fullwidth_quotes_and_untranslated_second_line() {
        let parser = SiglusParser::new();
        let mut entries = parser.parse_text("○0002○ “やあ”\n●0002●\n").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].original, "やあ");

        entries[0].translation = "Yo".to_string();
        let rebuilt = parser.rebuild_text(&entries).unwrap();
        assert_eq!(rebuilt, "○0002○ “Yo”\n●0002● “Yo”\n");
    }

    #[test]
    fn test_unquoted_pair_is_two_structural_entries() {
        let parser = SiglusParser::new();
        let entries = parser.parse_text("○010○ナレーション\n●010●ナレーション\n").unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.is_translatable()));
        assert_eq!(entries[0].entry_id, "raw-1");
        assert_eq!(entries[1].entry_id, "raw-2");
    }

    #[test]
    fn test_unmatched_lines_and_leftover() {
        let text = "header\n○1○\"a\"\n●1●\"a\"\ntrailing";
        let parser = SiglusParser::new();
        let entries = parser.parse_text(text).unwrap();

        assert_eq!(entries.len(), 3);
        assert!(!entries[0].is_translatable());
        assert!(entries[1].is_translatable());
        assert_eq!(entries[1].entry_id, "1");
        assert_eq!(entries[2].entry_id, "raw-4");
        assert_eq!(parser.rebuild_text(&entries).unwrap(), text);
    }

    #[test]
    fn test_missing_id_delimiter_passes_through() {
        let text = "○broken\"x\"\n●1●\"x\"\n";
        let parser = SiglusParser::new();
        let entries = parser.parse_text(text).unwrap();
        assert!(entries.iter().all(|e| !e.is_translatable()));
        assert_eq!(parser.rebuild_text(&entries).unwrap(), text);
    }

    #[test]
    fn test_roundtrip_crlf() {
        let text = "○1○\"a\"\r\n●1●\"b\"  \r\n\r\n○2○x\r\n●2●x";
        let parser = SiglusParser::new();
        let entries = parser.parse_text(text).unwrap();
        assert_eq!(parser.rebuild_text(&entries).unwrap(), text);
    }
}
