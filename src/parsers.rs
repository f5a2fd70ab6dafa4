/// 脚本格式解析器
///
/// 每种引擎一个解析器，共享 [`ScriptParser`] 能力契约：
/// - **artemis**: 花括号嵌套的块结构脚本（`.ast`）
/// - **kirikiri**: 逐行正则匹配的对话脚本（`.ks` / `.txt`）
/// - **siglus**: 成对行记录的文本导出（`.txt`）
///
/// 解析是单遍的，无法归类的行一律作为结构条目原样保留。
/// 重建时未翻译的条目输出原始行，已翻译的条目输出 `prefix + 译文 + suffix`，
/// 每行后接原有换行符，因此未修改的文本逐字节不变。
pub mod artemis;
pub mod kirikiri;
pub mod registry;
pub mod siglus;

use std::path::{Path, PathBuf};

use crate::entry::{EntryContext, TranslationEntry};
use crate::io::{DefaultScriptReader, DefaultScriptWriter, ScriptReader, ScriptWriter};
use crate::utils::{rebuilt_output_path, Result, SekaiError};

pub use artemis::ArtemisParser;
pub use kirikiri::KirikiriParser;
pub use registry::{normalize_language, ParserConstructor, ParserRegistry};
pub use siglus::SiglusParser;

/// 解析器能力契约
pub trait ScriptParser {
    /// 引擎名称（小写）
    fn engine_name(&self) -> &'static str;

    /// 仅按扩展名判断是否可处理
    fn can_parse(&self, path: &Path) -> bool;

    /// 当前绑定的目标语言
    fn language(&self) -> Option<&str>;

    fn set_language(&mut self, language: &str);

    /// 解析前的配置检查，缺少必需配置时失败
    fn check_ready(&self) -> Result<()> {
        Ok(())
    }

    /// 将已解码文本解析为有序条目
    fn parse_text(&self, text: &str) -> Result<Vec<TranslationEntry>>;

    /// 将条目序列重新序列化为文本
    fn rebuild_text(&self, entries: &[TranslationEntry]) -> Result<String>;

    /// 通过指定读取器解析文件
    fn parse_with(
        &self,
        reader: &dyn ScriptReader,
        path: &Path,
        encoding: &str,
    ) -> Result<Vec<TranslationEntry>> {
        self.check_ready()?;
        let script = reader.read(path, encoding)?;
        let entries = self.parse_text(&script.text)?;

        tracing::debug!(
            "[{}] 解析 {}: {} 个条目，其中 {} 个可翻译",
            self.engine_name(),
            path.display(),
            entries.len(),
            entries.iter().filter(|e| e.is_translatable()).count()
        );
        Ok(entries)
    }

    /// 解析文件
    fn parse(&self, path: &Path, encoding: &str) -> Result<Vec<TranslationEntry>> {
        self.parse_with(&DefaultScriptReader, path, encoding)
    }

    /// 通过指定写入器重建文件
    ///
    /// # 返回
    /// 输出路径 `<stem><suffix><ext>`，与源文件同目录
    fn rebuild_with(
        &self,
        writer: &dyn ScriptWriter,
        source: &Path,
        entries: &[TranslationEntry],
        encoding: &str,
        suffix: &str,
    ) -> Result<PathBuf> {
        let output = rebuilt_output_path(source, suffix);
        let text = self.rebuild_text(entries)?;
        writer.write(&text, &output, encoding)?;

        tracing::debug!("[{}] 重建 {} -> {}", self.engine_name(), source.display(), output.display());
        Ok(output)
    }

    /// 重建文件
    fn rebuild(
        &self,
        source: &Path,
        entries: &[TranslationEntry],
        encoding: &str,
        suffix: &str,
    ) -> Result<PathBuf> {
        self.rebuild_with(&DefaultScriptWriter, source, entries, encoding, suffix)
    }
}

/// 扩展名匹配（忽略大小写）
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// 字节顺序标记
pub(crate) const BOM: char = '\u{FEFF}';

/// 把文本开头的 BOM 拆为单独的结构条目
///
/// BOM 不属于首行内容，重建时由该条目原样写回。
/// 返回 `(BOM 条目, 去掉 BOM 的正文)`。
pub(crate) fn split_bom(text: &str) -> (Vec<TranslationEntry>, &str) {
    match text.strip_prefix(BOM) {
        Some(body) => (
            vec![TranslationEntry::structural("bom".to_string(), "\u{FEFF}", 1, "")],
            body,
        ),
        None => (Vec::new(), text),
    }
}

/// 结构条目与其他家族共用的输出：结构行原样写回
///
/// 返回 `Ok(true)` 表示已处理。
pub(crate) fn write_structural(output: &mut String, entry: &TranslationEntry) -> bool {
    if let EntryContext::Structural { raw_line, eol, .. } = &entry.context {
        output.push_str(raw_line);
        output.push_str(eol);
        true
    } else {
        false
    }
}

pub(crate) fn context_mismatch(entry: &TranslationEntry, expected: &'static str) -> SekaiError {
    SekaiError::ContextMismatch {
        entry_id: entry.entry_id.clone(),
        expected,
        found: entry.context.kind(),
    }
}

/// 行首空白的字节长度
pub(crate) fn leading_ws_len(content: &str) -> usize {
    content.len() - content.trim_start().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension_ignores_case() {
        assert!(has_extension(Path::new("a/B.AST"), &["ast"]));
        assert!(!has_extension(Path::new("a/b.ks"), &["ast"]));
        assert!(!has_extension(Path::new("a/noext"), &["ast"]));
    }

    #[test]
    fn test_split_bom() {
        let (lead, body) = split_bom("\u{FEFF}abc\n");
        assert_eq!(body, "abc\n");
        assert_eq!(lead.len(), 1);
        assert!(!lead[0].is_translatable());

        let mut out = String::new();
        write_structural(&mut out, &lead[0]);
        assert_eq!(out, "\u{FEFF}");

        let (lead, body) = split_bom("abc");
        assert!(lead.is_empty());
        assert_eq!(body, "abc");
    }

    #[test]
    fn test_write_structural() {
        let mut out = String::new();
        let entry = TranslationEntry::structural("raw-1".to_string(), "}", 1, "\r\n");
        assert!(write_structural(&mut out, &entry));
        assert_eq!(out, "}\r\n");
    }
}
