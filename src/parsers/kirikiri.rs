/// KiriKiri 对话脚本解析器（`.ks` / `.txt`）
///
/// - `<名字>"台词"` / `<名字>(心声)` → 带说话人的对白条目
/// - 其他非空行 → 整行旁白条目
/// - 空行 → 结构条目
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::{
    context_mismatch, has_extension, leading_ws_len, split_bom, write_structural, ScriptParser,
};
use crate::entry::{EntryContext, TranslationEntry};
use crate::io::{split_lines, ScriptLine};
use crate::utils::Result;

pub const ENGINE_NAME: &str = "kirikiri";

static DIALOG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?P<prefix><(?P<speaker>[^>]+)>["(])(?P<text>.+?)(?P<suffix>[")])$"#)
        .expect("valid dialog regex")
});

#[derive(Debug, Clone, Default)]
pub struct KirikiriParser {
    language: Option<String>,
}

impl KirikiriParser {
    pub fn new() -> Self {
        Self::default()
    }
}

fn classify(line: &ScriptLine<'_>) -> TranslationEntry {
    let content = line.content;
    let stripped = content.trim();

    if stripped.is_empty() {
        return TranslationEntry::structural(
            format!("raw-{}", line.number),
            content,
            line.number,
            line.eol,
        );
    }

    if let Some(caps) = DIALOG_REGEX.captures(stripped) {
        if let (Some(speaker), Some(text)) = (caps.name("speaker"), caps.name("text")) {
            let offset = leading_ws_len(content);
            let start = offset + text.start();
            let end = offset + text.end();

            return TranslationEntry::new(
                line.number.to_string(),
                text.as_str().to_string(),
                EntryContext::Dialogue {
                    raw_line: content.to_string(),
                    speaker: Some(speaker.as_str().to_string()),
                    prefix: content[..start].to_string(),
                    suffix: content[end..].to_string(),
                    line_number: line.number,
                    eol: line.eol.to_string(),
                },
            );
        }
    }

    // 旁白：整行可翻译
    TranslationEntry::new(
        line.number.to_string(),
        content.to_string(),
        EntryContext::Dialogue {
            raw_line: content.to_string(),
            speaker: None,
            prefix: String::new(),
            suffix: String::new(),
            line_number: line.number,
            eol: line.eol.to_string(),
        },
    )
}

impl ScriptParser for KirikiriParser {
    fn engine_name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn can_parse(&self, path: &Path) -> bool {
        has_extension(path, &["ks", "txt"])
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn set_language(&mut self, language: &str) {
        self.language = Some(language.to_string());
    }

    fn parse_text(&self, text: &str) -> Result<Vec<TranslationEntry>> {
        let (mut entries, body) = split_bom(text);
        entries.extend(split_lines(body).iter().map(classify));
        Ok(entries)
    }

    fn rebuild_text(&self, entries: &[TranslationEntry]) -> Result<String> {
        let mut output = String::new();

        for entry in entries {
            if write_structural(&mut output, entry) {
                continue;
            }
            match &entry.context {
                EntryContext::Dialogue {
                    raw_line,
                    prefix,
                    suffix,
                    eol,
                    ..
                } => {
                    if entry.translation.is_empty() {
                        output.push_str(raw_line);
                    } else {
                        output.push_str(prefix);
                        output.push_str(&entry.translation);
                        output.push_str(suffix);
                    }
                    output.push_str(eol);
                }
                _ => return Err(context_mismatch(entry, "dialogue")),
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialogue_line() {
        let parser = KirikiriParser::new();
        let entries = parser.parse_text("<Ann>\"Hi there\"\n").unwrap();

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.entry_id, "1");
        assert_eq!(entry.original, "Hi there");
        assert_eq!(entry.context.speaker(), Some("Ann"));
        assert_eq!(entry.context.prefix(), "<Ann>\"");
        assert_eq!(entry.context.suffix(), "\"");
    }

    #[test]
    fn test_bom_first_line_keeps_speaker() {
        let parser = KirikiriParser::new();
        let mut entries = parser.parse_text("\u{FEFF}<Ann>\"Hi\"\n").unwrap();

        let entry = &entries[1];
        assert_eq!(entry.entry_id, "1");
        assert_eq!(entry.original, "Hi");
        assert_eq!(entry.context.speaker(), Some("Ann"));

        entries[1].translation = "Oi".to_string();
        let rebuilt = parser.rebuild_text(&entries).unwrap();
        assert_eq!(rebuilt, "\u{FEFF}<Ann>\"Oi\"\n");
    }

    #[test]
    fn test_thought_line_with_indent() {
        let parser = KirikiriParser::new();
        let entries = parser.parse_text("  <Natsuki>(Hmm...)  ").unwrap();

        let entry = &entries[0];
        assert_eq!(entry.original, "Hmm...");
        assert_eq!(entry.context.prefix(), "  <Natsuki>(");
        assert_eq!(entry.context.suffix(), ")  ");
    }

    #[test]
    fn test_narration_and_blank_lines() {
        let parser = KirikiriParser::new();
        let entries = parser.parse_text("The rain kept falling.\n\n").unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_translatable());
        assert_eq!(entries[0].context.speaker(), None);
        assert_eq!(entries[0].original, "The rain kept falling.");
        assert!(!entries[1].is_translatable());
        assert_eq!(entries[1].entry_id, "raw-2");
    }

    #[test]
    fn test_rebuild_dialogue() {
        let parser = KirikiriParser::new();
        let mut entries = parser.parse_text("<Ann>\"Hi there\"\r\n\r\nNarration").unwrap();
        entries[0].translation = "Olá".to_string();
        entries[2].translation = "Narração".to_string();

        let rebuilt = parser.rebuild_text(&entries).unwrap();
        assert_eq!(rebuilt, "<Ann>\"Olá\"\r\n\r\nNarração");
    }

    #[test]
    fn test_roundtrip_untouched() {
        let text = "*start\n<A>\"x\"\n\t\n@bg storage=room\n<B>(y)\n";
        let parser = KirikiriParser::new();
        let entries = parser.parse_text(text).unwrap();
        assert_eq!(parser.rebuild_text(&entries).unwrap(), text);
    }

    #[test]
    fn test_can_parse() {
        let parser = KirikiriParser::new();
        assert!(parser.can_parse(Path::new("first.ks")));
        assert!(parser.can_parse(Path::new("first.TXT")));
        assert!(!parser.can_parse(Path::new("first.ast")));
    }
}
