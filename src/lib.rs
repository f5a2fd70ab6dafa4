pub mod config;
pub mod debug;
pub mod editor;
pub mod entry;
pub mod io;
pub mod parsers;
pub mod project;
pub mod qa;
pub mod status;
pub mod utils;

// 重新导出主要结构
pub use config::ProjectConfig;
pub use debug::ScriptDebugger;
pub use editor::{CommitOutcome, CompositeUndoAction, EntryStore, UndoAction, UndoStack};
pub use entry::{EntryContext, EntryKey, LiteralWrapper, TranslationEntry, TranslationRecord, TranslationStatus};
pub use parsers::{ParserRegistry, ScriptParser};
pub use project::Project;
pub use qa::{IssueLevel, QaIssue, QaValidator};
pub use status::{FileStats, ProjectStats, ProjectStatusReport};
pub use utils::{Result, SekaiError};

// 常量定义
pub const SUPPORTED_ENGINES: &[&str] = &["artemis", "kirikiri", "siglus"];
