/// 翻译项目
///
/// 持有项目配置、按文件保存的条目序列、条目索引、
/// 文件状态缓存以及撤销栈。文件内条目顺序在解析后不再改变。
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;
use crate::editor::{EntryStore, UndoStack};
use crate::entry::{EntryKey, TranslationEntry};
use crate::io::{DefaultScriptReader, DefaultScriptWriter, ScriptReader, ScriptWriter};
use crate::parsers::ParserRegistry;
use crate::qa::QaValidator;
use crate::utils::{create_backup, rebuilt_output_path, Result, SekaiError};

/// 文件到条目序列的映射及其 ID 索引
#[derive(Debug, Clone, Default)]
pub struct ProjectFiles {
    files: BTreeMap<PathBuf, Vec<TranslationEntry>>,
    /// 条目标识 -> 文件内位置
    index: HashMap<EntryKey, usize>,
}

impl ProjectFiles {
    /// 重建索引（文件映射每次变化后调用）
    fn reindex(&mut self) {
        self.index.clear();
        for (path, entries) in &self.files {
            for (position, entry) in entries.iter().enumerate() {
                self.index
                    .insert(EntryKey::new(path.clone(), entry.entry_id.clone()), position);
            }
        }
    }

    pub fn get(&self, key: &EntryKey) -> Option<&TranslationEntry> {
        let position = *self.index.get(key)?;
        self.files.get(key.file())?.get(position)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &[TranslationEntry])> {
        self.files
            .iter()
            .map(|(path, entries)| (path.as_path(), entries.as_slice()))
    }

    pub fn entries(&self, path: &Path) -> Option<&[TranslationEntry]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl EntryStore for ProjectFiles {
    fn entry_mut(&mut self, key: &EntryKey) -> Option<&mut TranslationEntry> {
        let position = *self.index.get(key)?;
        self.files.get_mut(key.file())?.get_mut(position)
    }
}

#[derive(Debug, Default)]
pub struct Project {
    pub config: ProjectConfig,
    pub(crate) files: ProjectFiles,
    /// 文件 -> 是否已有译文
    pub(crate) file_status_cache: HashMap<PathBuf, bool>,
    pub(crate) undo_stack: UndoStack,
}

impl Project {
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn files(&self) -> &ProjectFiles {
        &self.files
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    /// 重建条目索引
    pub fn index_entries(&mut self) {
        self.files.reindex();
    }

    /// 注册（或替换）一个文件的条目序列
    ///
    /// 计算 QA、刷新文件状态缓存，并清空撤销历史。
    pub fn add_file(&mut self, path: impl Into<PathBuf>, mut entries: Vec<TranslationEntry>) {
        let path = path.into();
        for entry in entries.iter_mut() {
            QaValidator::refresh(entry);
        }
        self.files.files.insert(path.clone(), entries);
        self.index_entries();
        self.update_file_status(&path);
        self.undo_stack.clear();
    }

    pub fn entries(&self, path: &Path) -> Option<&[TranslationEntry]> {
        self.files.entries(path)
    }

    pub fn entry(&self, key: &EntryKey) -> Option<&TranslationEntry> {
        self.files.get(key)
    }

    pub(crate) fn entry_mut(&mut self, key: &EntryKey) -> Result<&mut TranslationEntry> {
        self.files
            .entry_mut(key)
            .ok_or_else(|| SekaiError::UnknownEntry(key.clone()))
    }

    /// 可写入译文的条目，结构条目返回 [`SekaiError::NotTranslatable`]
    pub(crate) fn translatable_entry_mut(&mut self, key: &EntryKey) -> Result<&mut TranslationEntry> {
        let entry = self.entry_mut(key)?;
        if !entry.is_translatable() {
            return Err(SekaiError::NotTranslatable(key.clone()));
        }
        Ok(entry)
    }

    /// 通过指定读取器导入文件
    pub fn import_file_with(
        &mut self,
        registry: &ParserRegistry,
        reader: &dyn ScriptReader,
        path: &Path,
    ) -> Result<usize> {
        let parser = registry.get_parser(path, &self.config)?;
        let entries = parser.parse_with(reader, path, &self.config.encoding)?;
        let count = entries.len();
        self.add_file(path, entries);
        Ok(count)
    }

    /// 解析并注册文件
    ///
    /// # 返回
    /// 条目数量（含结构条目）
    pub fn import_file(&mut self, registry: &ParserRegistry, path: &Path) -> Result<usize> {
        self.import_file_with(registry, &DefaultScriptReader, path)
    }

    /// 通过指定写入器导出文件
    pub fn export_file_with(
        &self,
        registry: &ParserRegistry,
        writer: &dyn ScriptWriter,
        path: &Path,
        suffix: &str,
    ) -> Result<PathBuf> {
        let entries = self
            .files
            .entries(path)
            .ok_or_else(|| SekaiError::FileNotLoaded(path.to_path_buf()))?;

        let errors = QaValidator::count_errors(entries);
        if errors > 0 {
            tracing::warn!("{} 存在 {} 个 QA 错误，拒绝导出", path.display(), errors);
            return Err(SekaiError::ExportBlocked {
                path: path.to_path_buf(),
                errors,
            });
        }

        let parser = registry.get_parser(path, &self.config)?;

        // 覆盖前备份上一次导出的文件
        let previous = rebuilt_output_path(path, suffix);
        if self.config.backup_exports && previous.exists() {
            let backup = create_backup(&previous)?;
            tracing::info!("已备份旧的导出文件: {}", backup.display());
        }

        let output = parser.rebuild_with(writer, path, entries, &self.config.encoding, suffix)?;

        tracing::info!("已导出 {} -> {}", path.display(), output.display());
        Ok(output)
    }

    /// 重建已翻译文件，存在 QA 错误时拒绝
    pub fn export_file(&self, registry: &ParserRegistry, path: &Path, suffix: &str) -> Result<PathBuf> {
        self.export_file_with(registry, &DefaultScriptWriter, path, suffix)
    }

    /// 重新计算指定条目的 QA 结果与所属文件的状态缓存
    pub(crate) fn refresh_entries(&mut self, keys: &[EntryKey]) {
        let mut files: Vec<PathBuf> = Vec::new();
        for key in keys {
            if let Some(entry) = self.files.entry_mut(key) {
                QaValidator::refresh(entry);
            }
            if !files.iter().any(|f| f == key.file()) {
                files.push(key.file.clone());
            }
        }
        for file in files {
            self.update_file_status(&file);
        }
    }
}
