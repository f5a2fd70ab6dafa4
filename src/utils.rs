use thiserror::Error;
use std::path::{Path, PathBuf};

use crate::entry::EntryKey;

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum SekaiError {
    #[error("No target language configured for engine '{engine}'")]
    MissingLanguage { engine: String },

    #[error("No parser available for engine '{engine}' and file '{}'", path.display())]
    NoParser { engine: String, path: PathBuf },

    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    #[error("Character {character:?} cannot be encoded as {encoding}")]
    Unencodable { encoding: String, character: char },

    #[error("Entry '{entry_id}' carries a {found} context, expected {expected}")]
    ContextMismatch {
        entry_id: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Export of '{}' blocked by {errors} QA error(s)", path.display())]
    ExportBlocked { path: PathBuf, errors: usize },

    #[error("One or more selected entries already have a translation")]
    BatchOverwrite,

    #[error("Block count ({blocks}) does not match selected entry count ({entries})")]
    BlockCountMismatch { blocks: usize, entries: usize },

    #[error("Entry {0} is structural and cannot be translated")]
    NotTranslatable(EntryKey),

    #[error("Unknown entry: {0}")]
    UnknownEntry(EntryKey),

    #[error("File not loaded in project: {}", .0.display())]
    FileNotLoaded(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SekaiError>;

/// 计算重建输出路径：`<stem><suffix><ext>`，与源文件同目录
pub fn rebuilt_output_path(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match source.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    source.with_file_name(file_name)
}

/// 创建文件备份
pub fn create_backup(file_path: &Path) -> Result<PathBuf> {
    if !file_path.exists() {
        return Err(SekaiError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "原文件不存在"
        )));
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
    let backup_path = file_path.with_extension(format!("{}.bak", timestamp));

    std::fs::copy(file_path, &backup_path)?;
    tracing::debug!("已创建备份文件: {}", backup_path.display());

    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuilt_output_path() {
        let out = rebuilt_output_path(Path::new("scripts/op.ast"), ".pt");
        assert_eq!(out, PathBuf::from("scripts/op.pt.ast"));

        let out = rebuilt_output_path(Path::new("scripts/README"), "_tl");
        assert_eq!(out, PathBuf::from("scripts/README_tl"));
    }

    #[test]
    fn test_backup_missing_file() {
        let result = create_backup(Path::new("definitely/missing/file.ks"));
        assert!(matches!(result, Err(SekaiError::IoError(_))));
    }

    #[test]
    fn test_backup_copies_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ks");
        std::fs::write(&path, "line").unwrap();

        let backup = create_backup(&path).unwrap();
        assert!(backup.to_string_lossy().ends_with(".bak"));
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "line");
    }

    #[test]
    fn test_error_messages_name_engine_and_path() {
        let err = SekaiError::NoParser {
            engine: "siglus".to_string(),
            path: PathBuf::from("a.ast"),
        };
        let msg = err.to_string();
        assert!(msg.contains("siglus"));
        assert!(msg.contains("a.ast"));
    }
}
