/// 译文质量检查
///
/// 对单个条目做结构/内容检查，结果是数据而不是错误：
/// `Error` 级问题阻止导出，`Warning` 只作提示。
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::entry::{EntryContext, LiteralWrapper, TranslationEntry, TranslationStatus};

/// `{player_name}`、`[ruby=...]`、`<color=red>` 三类内联标签
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[^}]+\}|\[[^\]]+\]|<[^>]+>").expect("valid tag regex")
});

/// 译文长度超过原文此倍数时警告
pub const LENGTH_RATIO_LIMIT: f64 = 1.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaIssue {
    pub level: IssueLevel,
    /// 简短标识，如 `MISSING_TAG`
    pub code: String,
    pub message: String,
}

impl QaIssue {
    fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            code: code.to_string(),
            message: message.into(),
        }
    }

    fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == IssueLevel::Error
    }
}

impl std::fmt::Display for QaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.level {
            IssueLevel::Warning => "警告",
            IssueLevel::Error => "错误",
        };
        write!(f, "[{}] {}: {}", level, self.code, self.message)
    }
}

fn collect_tags(text: &str) -> BTreeSet<&str> {
    TAG_REGEX.find_iter(text).map(|m| m.as_str()).collect()
}

/// 字面量的闭合引号（译文中出现会破坏语法）
fn closing_quote(context: &EntryContext) -> Option<char> {
    match context {
        EntryContext::Block { wrapper, .. } => match wrapper {
            LiteralWrapper::Quoted | LiteralWrapper::LongBracketQuoted => Some('"'),
            LiteralWrapper::LongBracket => None,
        },
        EntryContext::Dialogue { suffix, .. } | EntryContext::Paired { suffix_a: suffix, .. } => {
            suffix.trim_start().chars().next().filter(|c| matches!(c, '"' | '”' | ')'))
        }
        EntryContext::Structural { .. } => None,
    }
}

pub struct QaValidator;

impl QaValidator {
    /// 检查单个条目，按固定顺序返回问题列表
    pub fn validate(entry: &TranslationEntry) -> Vec<QaIssue> {
        let mut issues = Vec::new();

        if !entry.is_translatable() {
            return issues;
        }

        let original = entry.original.as_str();
        let translation = entry.translation.as_str();
        let prefix = entry.context.prefix();
        let suffix = entry.context.suffix();
        let touched = entry.status != TranslationStatus::Untranslated;

        // 与重建一致：无译文时原样输出原始行
        let rebuilt = if translation.is_empty() {
            entry.context.raw_line().to_string()
        } else {
            format!("{}{}{}", prefix, translation, suffix)
        };

        // 1. 译文为空
        if touched && !original.trim().is_empty() && translation.trim().is_empty() {
            issues.push(QaIssue::warning("EMPTY_TRANSLATION", "译文为空。"));
        }

        // 2. 译文与原文相同（只比较可提取的核心文本）
        let original_core = if original.len() >= prefix.len() + suffix.len() {
            original
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix))
                .unwrap_or(original)
        } else {
            original
        };
        if touched && !translation.trim().is_empty() && translation.trim() == original_core.trim() {
            issues.push(QaIssue::warning("IDENTICAL_TEXT", "译文与原文相同。"));
        }

        // 3. 缺失标签（集合比较）
        let original_tags = collect_tags(original);
        let rebuilt_tags = collect_tags(&rebuilt);
        let missing: Vec<&str> = original_tags.difference(&rebuilt_tags).copied().collect();
        if !missing.is_empty() {
            issues.push(QaIssue::error(
                "MISSING_TAG",
                format!("译文缺少标签: {}", missing.join(", ")),
            ));
        }

        // 4. 前后缀完整性：写回后的第一行物理行
        let first_line = rebuilt.split(['\n', '\r']).next().unwrap_or_default();
        if !prefix.is_empty() && !first_line.starts_with(prefix) {
            issues.push(QaIssue::error("PREFIX_MISMATCH", "原有前缀未被保留。"));
        }
        if !suffix.is_empty() && !first_line.ends_with(suffix) {
            issues.push(QaIssue::error("SUFFIX_MISMATCH", "原有后缀未被保留。"));
        }

        // 5. 译文过长
        let original_len = original.chars().count() as f64;
        let translation_len = translation.chars().count() as f64;
        if touched
            && !original.trim().is_empty()
            && !translation.trim().is_empty()
            && translation_len > original_len * LENGTH_RATIO_LIMIT
        {
            issues.push(QaIssue::warning("TEXT_TOO_LONG", "译文明显长于原文。"));
        }

        // 6. 译文含有字面量的闭合引号
        if let Some(quote) = closing_quote(&entry.context) {
            if translation.contains(quote) {
                issues.push(QaIssue::warning(
                    "QUOTE_IN_TEXT",
                    format!("译文包含闭合符 {}，可能破坏脚本语法。", quote),
                ));
            }
        }

        issues
    }

    /// 重新计算条目的 QA 结果
    pub fn refresh(entry: &mut TranslationEntry) {
        entry.qa_issues = Self::validate(entry);
    }

    /// 任一条目存在错误级问题
    pub fn has_blocking_errors(entries: &[TranslationEntry]) -> bool {
        Self::count_errors(entries) > 0
    }

    pub fn count_errors(entries: &[TranslationEntry]) -> usize {
        entries
            .iter()
            .map(|e| Self::validate(e).iter().filter(|i| i.is_error()).count())
            .sum()
    }
}
