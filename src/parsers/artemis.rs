/// Artemis 块结构脚本解析器（`.ast`）
///
/// 脚本形如：
///
/// ```text
/// block_00010 = {
///     text = {
///         ja = {
///             "こんにちは",
///         },
///         en = {
///             [[Hello]],
///         },
///     },
/// },
/// ```
///
/// 三层嵌套（block / text / 语言节）各自维护花括号深度，
/// 只有目标语言节中以 `"` 或 `[[` 开头的行才被视为可翻译字面量。
use std::path::Path;

use super::{
    context_mismatch, has_extension, leading_ws_len, split_bom, write_structural, ScriptParser,
};
use crate::entry::{EntryContext, LiteralWrapper, TranslationEntry};
use crate::io::{split_lines, ScriptLine};
use crate::utils::{Result, SekaiError};

pub const ENGINE_NAME: &str = "artemis";

#[derive(Debug, Clone, Default)]
pub struct ArtemisParser {
    language: Option<String>,
}

impl ArtemisParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(language: &str) -> Self {
        Self {
            language: Some(language.to_string()),
        }
    }
}

/// 单次解析的嵌套状态，解析结束即丢弃
#[derive(Debug, Default)]
struct BlockState {
    inside_block: bool,
    inside_text: bool,
    inside_lang: bool,
    block_depth: i32,
    text_depth: i32,
    lang_depth: i32,
}

impl BlockState {
    /// 处理一行，返回对应条目
    fn step(&mut self, line: &ScriptLine<'_>, language: &str) -> TranslationEntry {
        let stripped = line.content.trim();
        let net = brace_balance(stripped);

        if !self.inside_block {
            if stripped.starts_with("block_") && stripped.ends_with('{') && net > 0 {
                self.inside_block = true;
                self.block_depth = net;
            }
            return raw_entry(line);
        }

        self.block_depth += net;

        if !self.inside_text && opens_section(stripped, "text") && net > 0 {
            self.inside_text = true;
            self.text_depth = net;
            return raw_entry(line);
        }

        if self.inside_text {
            self.text_depth += net;

            if !self.inside_lang && opens_section(stripped, language) && net > 0 {
                self.inside_lang = true;
                self.lang_depth = net;
                return raw_entry(line);
            }

            if self.inside_lang {
                self.lang_depth += net;

                if self.lang_depth <= 0 {
                    self.inside_lang = false;
                    return raw_entry(line);
                }

                return literal_entry(line, language).unwrap_or_else(|| raw_entry(line));
            }

            if self.text_depth <= 0 {
                self.inside_text = false;
            }
            return raw_entry(line);
        }

        if self.block_depth <= 0 {
            self.inside_block = false;
        }
        raw_entry(line)
    }
}

/// `{` 与 `}` 的数量差
fn brace_balance(stripped: &str) -> i32 {
    let open = stripped.matches('{').count() as i32;
    let close = stripped.matches('}').count() as i32;
    open - close
}

/// `key = {` 形式的节开头
fn opens_section(stripped: &str, key: &str) -> bool {
    if !stripped.ends_with('{') {
        return false;
    }
    stripped
        .split_once('=')
        .map(|(name, _)| name.trim() == key)
        .unwrap_or(false)
}

fn raw_entry(line: &ScriptLine<'_>) -> TranslationEntry {
    TranslationEntry::structural(line.number.to_string(), line.content, line.number, line.eol)
}

/// 提取字面量行
///
/// 去掉行尾逗号后识别三种写法：`"…"`、`[[…]]`、`[["…"]]`。
/// 文本为空或缺少闭合符的行返回 `None`，按结构行处理。
fn literal_entry(line: &ScriptLine<'_>, language: &str) -> Option<TranslationEntry> {
    let content = line.content;
    let raw = content.trim().trim_end_matches(',');

    let (open_len, text, wrapper) = if let Some(inner) = raw.strip_prefix("[[") {
        let inner = inner.strip_suffix("]]")?;
        if inner.len() >= 2 && inner.starts_with('"') && inner.ends_with('"') {
            (3, &inner[1..inner.len() - 1], LiteralWrapper::LongBracketQuoted)
        } else {
            (2, inner, LiteralWrapper::LongBracket)
        }
    } else if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        (1, &raw[1..raw.len() - 1], LiteralWrapper::Quoted)
    } else {
        return None;
    };

    if text.trim().is_empty() {
        return None;
    }

    let start = leading_ws_len(content) + open_len;
    let end = start + text.len();

    Some(TranslationEntry::new(
        line.number.to_string(),
        text.to_string(),
        EntryContext::Block {
            raw_line: content.to_string(),
            prefix: content[..start].to_string(),
            suffix: content[end..].to_string(),
            wrapper,
            language: language.to_string(),
            line_number: line.number,
            eol: line.eol.to_string(),
        },
    ))
}

fn is_quote_wrapped(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

/// 组装字面量行
///
/// 无内层引号的 `[[…]]` 写法在替换文本未带引号时补上引号，
/// 否则原样拼接 `prefix + 文本 + suffix`。
pub fn render_literal(prefix: &str, text: &str, suffix: &str, wrapper: LiteralWrapper) -> String {
    if wrapper == LiteralWrapper::LongBracket && !is_quote_wrapped(text) {
        format!("{}\"{}\"{}", prefix, text, suffix)
    } else {
        format!("{}{}{}", prefix, text, suffix)
    }
}

impl ScriptParser for ArtemisParser {
    fn engine_name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn can_parse(&self, path: &Path) -> bool {
        has_extension(path, &["ast"])
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn set_language(&mut self, language: &str) {
        self.language = Some(language.to_string());
    }

    fn check_ready(&self) -> Result<()> {
        match self.language.as_deref() {
            Some(lang) if !lang.is_empty() => Ok(()),
            _ => Err(SekaiError::MissingLanguage {
                engine: ENGINE_NAME.to_string(),
            }),
        }
    }

    fn parse_text(&self, text: &str) -> Result<Vec<TranslationEntry>> {
        self.check_ready()?;
        let language = self.language.as_deref().unwrap_or_default();

        let (mut entries, body) = split_bom(text);
        let mut state = BlockState::default();
        entries.extend(split_lines(body).iter().map(|line| state.step(line, language)));
        Ok(entries)
    }

    fn rebuild_text(&self, entries: &[TranslationEntry]) -> Result<String> {
        let mut output = String::new();

        for entry in entries {
            if write_structural(&mut output, entry) {
                continue;
            }
            match &entry.context {
                EntryContext::Block {
                    raw_line,
                    prefix,
                    suffix,
                    wrapper,
                    eol,
                    ..
                } => {
                    if entry.translation.is_empty() {
                        output.push_str(raw_line);
                    } else {
                        output.push_str(&render_literal(prefix, &entry.translation, suffix, *wrapper));
                    }
                    output.push_str(eol);
                }
                _ => return Err(context_mismatch(entry, "block")),
            }
        }

        Ok(output)
    }
}
