use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::qa::QaIssue;

/// 翻译状态
///
/// `Reviewed` 仅为兼容保留，自动流程不会设置，也不计入进度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    #[default]
    Untranslated,
    InProgress,
    Translated,
    Reviewed,
}

impl TranslationStatus {
    /// 提交译文后推导出的状态
    pub fn for_committed_text(text: &str) -> Self {
        if text.trim().is_empty() {
            TranslationStatus::Untranslated
        } else {
            TranslationStatus::Translated
        }
    }

    /// 编辑中（未确认）的译文推导出的状态
    pub fn for_edited_text(text: &str) -> Self {
        if text.trim().is_empty() {
            TranslationStatus::Untranslated
        } else {
            TranslationStatus::InProgress
        }
    }
}

impl std::fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TranslationStatus::Untranslated => "untranslated",
            TranslationStatus::InProgress => "in_progress",
            TranslationStatus::Translated => "translated",
            TranslationStatus::Reviewed => "reviewed",
        };
        f.write_str(name)
    }
}

/// 字面量的引号约定
///
/// 重建时据此决定是否需要补引号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralWrapper {
    /// `"文本"`
    Quoted,
    /// `[[文本]]`
    LongBracket,
    /// `[["文本"]]`，内层引号属于 prefix/suffix
    LongBracketQuoted,
}

/// 每个条目的重建元数据
///
/// 每种解析器家族一个变体，解析后只读。
/// `eol` 保存该物理行原有的换行符（`"\n"`、`"\r\n"`，末行无换行时为空）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryContext {
    /// 原样保留的结构行
    Structural {
        raw_line: String,
        line_number: usize,
        eol: String,
    },
    /// 块结构脚本（Artemis）中的字面量行
    Block {
        raw_line: String,
        prefix: String,
        suffix: String,
        wrapper: LiteralWrapper,
        language: String,
        line_number: usize,
        eol: String,
    },
    /// 对话脚本（KiriKiri）的一行：对白或旁白
    Dialogue {
        raw_line: String,
        speaker: Option<String>,
        prefix: String,
        suffix: String,
        line_number: usize,
        eol: String,
    },
    /// 成对行记录（Siglus），同一句话存两次
    Paired {
        raw_line_a: String,
        raw_line_b: String,
        prefix_a: String,
        prefix_b: String,
        suffix_a: String,
        suffix_b: String,
        line_number: usize,
        eol_a: String,
        eol_b: String,
    },
}

impl EntryContext {
    pub fn is_translatable(&self) -> bool {
        !matches!(self, EntryContext::Structural { .. })
    }

    /// 源文件中的原始行（成对记录返回第一行）
    pub fn raw_line(&self) -> &str {
        match self {
            EntryContext::Structural { raw_line, .. }
            | EntryContext::Block { raw_line, .. }
            | EntryContext::Dialogue { raw_line, .. } => raw_line,
            EntryContext::Paired { raw_line_a, .. } => raw_line_a,
        }
    }

    pub fn prefix(&self) -> &str {
        match self {
            EntryContext::Structural { .. } => "",
            EntryContext::Block { prefix, .. } | EntryContext::Dialogue { prefix, .. } => prefix,
            EntryContext::Paired { prefix_a, .. } => prefix_a,
        }
    }

    pub fn suffix(&self) -> &str {
        match self {
            EntryContext::Structural { .. } => "",
            EntryContext::Block { suffix, .. } | EntryContext::Dialogue { suffix, .. } => suffix,
            EntryContext::Paired { suffix_a, .. } => suffix_a,
        }
    }

    pub fn wrapper(&self) -> Option<LiteralWrapper> {
        match self {
            EntryContext::Block { wrapper, .. } => Some(*wrapper),
            _ => None,
        }
    }

    pub fn speaker(&self) -> Option<&str> {
        match self {
            EntryContext::Dialogue { speaker, .. } => speaker.as_deref(),
            _ => None,
        }
    }

    pub fn line_number(&self) -> usize {
        match self {
            EntryContext::Structural { line_number, .. }
            | EntryContext::Block { line_number, .. }
            | EntryContext::Dialogue { line_number, .. }
            | EntryContext::Paired { line_number, .. } => *line_number,
        }
    }

    /// 上下文家族名，用于错误信息
    pub fn kind(&self) -> &'static str {
        match self {
            EntryContext::Structural { .. } => "structural",
            EntryContext::Block { .. } => "block",
            EntryContext::Dialogue { .. } => "dialogue",
            EntryContext::Paired { .. } => "paired",
        }
    }
}

/// 翻译条目
///
/// - 解析时创建，`context` 之后只读
/// - 编辑和撤销/重做只修改 `translation` 与 `status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// 文件内唯一的条目 ID
    pub entry_id: String,
    /// 提取出的原文（结构行为空）
    pub original: String,
    /// 译文
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub status: TranslationStatus,
    pub context: EntryContext,
    /// QA 结果，随时重新计算，不持久化
    #[serde(skip)]
    pub qa_issues: Vec<QaIssue>,
}

impl TranslationEntry {
    /// 创建结构条目
    pub fn structural(entry_id: String, raw_line: &str, line_number: usize, eol: &str) -> Self {
        Self::new(
            entry_id,
            String::new(),
            EntryContext::Structural {
                raw_line: raw_line.to_string(),
                line_number,
                eol: eol.to_string(),
            },
        )
    }

    /// 创建可翻译条目
    pub fn new(entry_id: String, original: String, context: EntryContext) -> Self {
        TranslationEntry {
            entry_id,
            original,
            translation: String::new(),
            status: TranslationStatus::Untranslated,
            context,
            qa_issues: Vec::new(),
        }
    }

    pub fn is_translatable(&self) -> bool {
        self.context.is_translatable()
    }

    /// 重建时使用的文本：有译文用译文，否则用原文
    pub fn text_to_apply(&self) -> &str {
        if self.translation.is_empty() {
            &self.original
        } else {
            &self.translation
        }
    }
}

/// 项目范围内的条目标识
///
/// 解析器给出的 `entry_id` 只在单个文件内唯一，
/// 项目用文件路径加以限定。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryKey {
    pub file: PathBuf,
    pub entry_id: String,
}

impl EntryKey {
    pub fn new(file: impl Into<PathBuf>, entry_id: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            entry_id: entry_id.into(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.file.display(), self.entry_id)
    }
}

/// 译文交换记录
///
/// CLI 导出/导入译文时使用的扁平结构，只含可翻译条目。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub entry_id: String,
    pub original: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub status: TranslationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl From<&TranslationEntry> for TranslationRecord {
    fn from(entry: &TranslationEntry) -> Self {
        TranslationRecord {
            entry_id: entry.entry_id.clone(),
            original: entry.original.clone(),
            translation: entry.translation.clone(),
            status: entry.status,
            speaker: entry.context.speaker().map(str::to_string),
        }
    }
}
