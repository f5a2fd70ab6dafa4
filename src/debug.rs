use crate::entry::{EntryContext, TranslationEntry};
use crate::io::{decode, split_lines};
use crate::utils::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// 脚本往返调试器
pub struct ScriptDebugger;

impl ScriptDebugger {
    /// 生成条目序列的详细 dump
    pub fn dump_entries(entries: &[TranslationEntry], output_path: &Path) -> Result<()> {
        let mut output = File::create(output_path)?;
        Self::write_entries(&mut output, entries)
    }

    /// 写入条目 dump
    pub fn write_entries<W: Write>(output: &mut W, entries: &[TranslationEntry]) -> Result<()> {
        let translatable = entries.iter().filter(|e| e.is_translatable()).count();
        writeln!(output, "=== 条目结构dump ===")?;
        writeln!(output, "条目总数: {} (可翻译 {})", entries.len(), translatable)?;
        writeln!(output)?;

        for entry in entries {
            Self::dump_entry(output, entry)?;
        }
        Ok(())
    }

    /// Dump 单个条目
    fn dump_entry<W: Write>(output: &mut W, entry: &TranslationEntry) -> Result<()> {
        let context = &entry.context;
        writeln!(
            output,
            "[{}] 行 {} ({}) {{",
            entry.entry_id,
            context.line_number(),
            context.kind()
        )?;

        match context {
            EntryContext::Structural { raw_line, eol, .. } => {
                writeln!(output, "  原始行: {:?}", raw_line)?;
                writeln!(output, "  换行符: {:?}", eol)?;
            }
            EntryContext::Block { wrapper, language, eol, .. } => {
                writeln!(output, "  包装: {:?}", wrapper)?;
                writeln!(output, "  语言: {}", language)?;
                writeln!(output, "  换行符: {:?}", eol)?;
            }
            EntryContext::Dialogue { speaker, eol, .. } => {
                writeln!(output, "  说话人: {}", speaker.as_deref().unwrap_or("-"))?;
                writeln!(output, "  换行符: {:?}", eol)?;
            }
            EntryContext::Paired { raw_line_b, prefix_b, suffix_b, eol_a, eol_b, .. } => {
                writeln!(output, "  第二行: {:?}", raw_line_b)?;
                writeln!(output, "  第二行前缀/后缀: {:?} / {:?}", prefix_b, suffix_b)?;
                writeln!(output, "  换行符: {:?} / {:?}", eol_a, eol_b)?;
            }
        }

        if entry.is_translatable() {
            writeln!(output, "  前缀: {:?}", context.prefix())?;
            writeln!(output, "  原文: {:?}", entry.original)?;
            writeln!(output, "  后缀: {:?}", context.suffix())?;
            writeln!(output, "  译文: {:?}", entry.translation)?;
            writeln!(output, "  状态: {}", entry.status)?;
            for issue in &entry.qa_issues {
                writeln!(output, "  ⚠ {}", issue)?;
            }
        }

        writeln!(output, "}}")?;
        Ok(())
    }

    /// 对比源文件与重建文件
    ///
    /// # 返回
    /// 不一致的行数
    pub fn compare_files(
        original_path: &Path,
        rebuilt_path: &Path,
        encoding: &str,
        output_path: &Path,
    ) -> Result<usize> {
        let (original, _) = decode(&std::fs::read(original_path)?, encoding)?;
        let (rebuilt, _) = decode(&std::fs::read(rebuilt_path)?, encoding)?;

        let mut output = File::create(output_path)?;
        writeln!(output, "=== 脚本文件对比 ===")?;
        writeln!(output, "原始文件: {}", original_path.display())?;
        writeln!(output, "重建文件: {}", rebuilt_path.display())?;
        writeln!(output)?;

        Self::compare_text(&mut output, &original, &rebuilt)
    }

    /// 逐行对比两段文本（含换行符）
    pub fn compare_text<W: Write>(output: &mut W, original: &str, rebuilt: &str) -> Result<usize> {
        let original_lines = split_lines(original);
        let rebuilt_lines = split_lines(rebuilt);

        writeln!(output, "=== 基本信息对比 ===")?;
        writeln!(output, "行数: {} vs {}", original_lines.len(), rebuilt_lines.len())?;
        writeln!(output, "字节数: {} vs {}", original.len(), rebuilt.len())?;
        writeln!(output)?;

        writeln!(output, "=== 逐行对比 ===")?;
        let mut differences = 0;
        let common = std::cmp::min(original_lines.len(), rebuilt_lines.len());
        for i in 0..common {
            let (a, b) = (&original_lines[i], &rebuilt_lines[i]);
            if a.content != b.content {
                differences += 1;
                writeln!(output, "行 {}:", a.number)?;
                writeln!(output, "  - {:?}", a.content)?;
                writeln!(output, "  + {:?}", b.content)?;
            } else if a.eol != b.eol {
                differences += 1;
                writeln!(output, "行 {}: ⚠ 换行符不匹配: {:?} vs {:?}", a.number, a.eol, b.eol)?;
            }
        }

        if original_lines.len() != rebuilt_lines.len() {
            differences += original_lines.len().abs_diff(rebuilt_lines.len());
            writeln!(output, "⚠ 行数不匹配！")?;
        }

        if differences == 0 {
            writeln!(output, "✓ 完全一致")?;
        }
        Ok(differences)
    }
}
