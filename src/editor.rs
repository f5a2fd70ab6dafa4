/// 编辑器层模块
///
/// 所有修改只发生在内存中的条目上，导出时才写回文件。
///
/// # 架构设计
///
/// - **undo**: 字段级撤销/重做栈，按条目标识查找
/// - **commit**: 编辑/提交流程，派生状态并记录组合撤销动作
///
/// # 使用示例
///
/// ```rust,ignore
/// use sekai_translator::{EntryKey, ParserRegistry, Project, ProjectConfig};
///
/// let mut project = Project::new(ProjectConfig::new("demo", "scripts", "kirikiri", "en"));
/// project.import_file(&ParserRegistry::builtin(), Path::new("scripts/first.ks"))?;
///
/// let key = EntryKey::new("scripts/first.ks", "3");
/// let outcome = project.commit_translation(&[key], "Olá")?;
/// project.undo();
/// ```
pub mod commit;
pub mod undo;

// === 导出公共接口 ===
pub use commit::CommitOutcome;
pub use undo::{CompositeUndoAction, EntryStore, FieldChange, UndoAction, UndoRecord, UndoStack};
