/// 撤销/重做模块
///
/// 以字段为粒度记录条目修改，支持撤销/重做。
/// 动作只保存条目标识，应用时通过 [`EntryStore`] 按 ID 查找条目，
/// 不依赖任何位置信息。
use std::fmt;

use crate::entry::{EntryKey, TranslationEntry, TranslationStatus};

/// 按 ID 查找条目的存储
pub trait EntryStore {
    fn entry_mut(&mut self, key: &EntryKey) -> Option<&mut TranslationEntry>;
}

/// 单个字段的修改前后值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Translation { old: String, new: String },
    Status { old: TranslationStatus, new: TranslationStatus },
}

impl FieldChange {
    fn apply(&self, entry: &mut TranslationEntry, forward: bool) {
        match self {
            FieldChange::Translation { old, new } => {
                entry.translation = if forward { new.clone() } else { old.clone() };
            }
            FieldChange::Status { old, new } => {
                entry.status = if forward { *new } else { *old };
            }
        }
    }
}

/// 针对单个条目单个字段的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoAction {
    pub key: EntryKey,
    pub change: FieldChange,
}

impl UndoAction {
    pub fn translation(key: EntryKey, old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            key,
            change: FieldChange::Translation {
                old: old.into(),
                new: new.into(),
            },
        }
    }

    pub fn status(key: EntryKey, old: TranslationStatus, new: TranslationStatus) -> Self {
        Self {
            key,
            change: FieldChange::Status { old, new },
        }
    }

    /// 应用动作，条目不存在时静默忽略
    ///
    /// # 返回
    /// 条目存在时返回 `true`
    fn apply<S: EntryStore + ?Sized>(&self, store: &mut S, forward: bool) -> bool {
        match store.entry_mut(&self.key) {
            Some(entry) => {
                self.change.apply(entry, forward);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for UndoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.change {
            FieldChange::Translation { old, new } => write!(
                f,
                "[{}] translation: \"{}\" -> \"{}\"",
                self.key,
                shorten(old),
                shorten(new)
            ),
            FieldChange::Status { old, new } => {
                write!(f, "[{}] status: {} -> {}", self.key, old, new)
            }
        }
    }
}

/// 按字符截断过长的值
fn shorten(value: &str) -> String {
    if value.chars().count() > 30 {
        format!("{}...", value.chars().take(30).collect::<String>())
    } else {
        value.to_string()
    }
}

/// 作为一个整体撤销/重做的一组动作
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeUndoAction {
    pub actions: Vec<UndoAction>,
}

impl CompositeUndoAction {
    pub fn new(actions: Vec<UndoAction>) -> Self {
        Self { actions }
    }

    pub fn push(&mut self, action: UndoAction) {
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// 撤销栈中的一条记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoRecord {
    Single(UndoAction),
    Composite(CompositeUndoAction),
}

impl UndoRecord {
    fn actions(&self) -> &[UndoAction] {
        match self {
            UndoRecord::Single(action) => std::slice::from_ref(action),
            UndoRecord::Composite(composite) => &composite.actions,
        }
    }

    /// 撤销时逆序应用，重做时正序应用
    fn apply<S: EntryStore + ?Sized>(&self, store: &mut S, forward: bool) -> Vec<EntryKey> {
        let mut touched: Vec<EntryKey> = Vec::new();
        let mut record = |action: &UndoAction, store: &mut S| {
            if action.apply(store, forward) && !touched.contains(&action.key) {
                touched.push(action.key.clone());
            }
        };

        if forward {
            for action in self.actions() {
                record(action, &mut *store);
            }
        } else {
            for action in self.actions().iter().rev() {
                record(action, &mut *store);
            }
        }
        touched
    }
}

impl From<UndoAction> for UndoRecord {
    fn from(action: UndoAction) -> Self {
        UndoRecord::Single(action)
    }
}

impl From<CompositeUndoAction> for UndoRecord {
    fn from(composite: CompositeUndoAction) -> Self {
        UndoRecord::Composite(composite)
    }
}

/// 撤销/重做栈
///
/// # 实现细节
/// - 两个栈：`undo` 与 `redo`
/// - 新记录入栈时清空重做栈
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    undo: Vec<UndoRecord>,
    redo: Vec<UndoRecord>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// 压入一条记录，空的组合动作被忽略
    pub fn push(&mut self, record: impl Into<UndoRecord>) {
        let record = record.into();
        if let UndoRecord::Composite(composite) = &record {
            if composite.is_empty() {
                return;
            }
        }
        self.undo.push(record);
        self.redo.clear();
    }

    /// 撤销最后一条记录
    ///
    /// # 返回
    /// 受影响的条目标识；栈为空时返回空列表
    pub fn undo<S: EntryStore + ?Sized>(&mut self, store: &mut S) -> Vec<EntryKey> {
        let Some(record) = self.undo.pop() else {
            return Vec::new();
        };
        let touched = record.apply(store, false);
        self.redo.push(record);
        touched
    }

    /// 重做最后一次撤销的记录
    pub fn redo<S: EntryStore + ?Sized>(&mut self, store: &mut S) -> Vec<EntryKey> {
        let Some(record) = self.redo.pop() else {
            return Vec::new();
        };
        let touched = record.apply(store, true);
        self.undo.push(record);
        touched
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// 可撤销的记录数
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// 人类可读的摘要
    pub fn summary(&self) -> String {
        format!(
            "可撤销: {}, 可重做: {}",
            self.undo.len(),
            self.redo.len()
        )
    }
}

impl fmt::Display for UndoStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for record in self.undo.iter().rev() {
            for action in record.actions() {
                writeln!(f, "  {}", action)?;
            }
        }
        Ok(())
    }
}
