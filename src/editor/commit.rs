/// 译文提交流程
///
/// 编辑、提交、撤销/重做都只改内存中的条目，
/// 每次操作作为一条组合撤销记录入栈，并刷新受影响条目的 QA 与文件状态。
use crate::entry::{EntryKey, TranslationStatus};
use crate::project::Project;
use crate::utils::{Result, SekaiError};

use super::undo::{CompositeUndoAction, UndoAction};

/// 提交结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// 实际被修改的条目
    pub changed: Vec<EntryKey>,
    /// 同一文件中最后一个选中条目之后的下一个可翻译条目
    pub advance_to: Option<EntryKey>,
}

impl CommitOutcome {
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}

/// 按空行把输入切分为块，块内各行以 `\n` 连接
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n").trim().to_string());
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n").trim().to_string());
    }
    blocks
}

impl Project {
    /// 编辑中的译文（未确认）
    ///
    /// 状态变为 `InProgress`，空文本为 `Untranslated`。结构条目不接受译文。
    pub fn edit_text(&mut self, key: &EntryKey, text: &str) -> Result<bool> {
        let new_status = TranslationStatus::for_edited_text(text);
        let entry = self.translatable_entry_mut(key)?;
        if entry.translation == text && entry.status == new_status {
            return Ok(false);
        }

        let old_text = std::mem::replace(&mut entry.translation, text.to_string());
        let old_status = std::mem::replace(&mut entry.status, new_status);

        self.undo_stack.push(CompositeUndoAction::new(vec![
            UndoAction::translation(key.clone(), old_text, text),
            UndoAction::status(key.clone(), old_status, new_status),
        ]));
        self.refresh_entries(std::slice::from_ref(key));
        Ok(true)
    }

    /// 确认译文（单条或批量）
    ///
    /// # 行为
    /// - 输入去除首尾空白，空输入不做任何事
    /// - 任一条目未知或为结构条目时整体拒绝，不做任何修改
    /// - 单条：整段文本作为译文
    /// - 批量：已有译文的条目存在时拒绝；按空行分块，
    ///   1 块应用到全部条目，N 块按顺序对应 N 个条目
    /// - 全部修改作为一条组合撤销记录
    pub fn commit_translation(&mut self, keys: &[EntryKey], raw_text: &str) -> Result<CommitOutcome> {
        let raw_text = raw_text.trim();
        if keys.is_empty() || raw_text.is_empty() {
            return Ok(CommitOutcome::default());
        }

        for key in keys {
            self.translatable_entry_mut(key)?;
        }

        let texts: Vec<String> = if keys.len() == 1 {
            vec![raw_text.to_string()]
        } else {
            let already_translated = keys
                .iter()
                .filter_map(|key| self.entry(key))
                .any(|entry| !entry.translation.is_empty());
            if already_translated {
                return Err(SekaiError::BatchOverwrite);
            }

            let blocks = split_blocks(raw_text);
            match blocks.len() {
                1 => vec![blocks[0].clone(); keys.len()],
                n if n == keys.len() => blocks,
                n => {
                    return Err(SekaiError::BlockCountMismatch {
                        blocks: n,
                        entries: keys.len(),
                    })
                }
            }
        };

        let mut composite = CompositeUndoAction::default();
        let mut changed = Vec::new();

        for (key, text) in keys.iter().zip(texts) {
            let new_status = TranslationStatus::for_committed_text(&text);
            let entry = self.translatable_entry_mut(key)?;
            if entry.translation == text && entry.status == new_status {
                continue;
            }

            let old_status = std::mem::replace(&mut entry.status, new_status);
            let old_text = std::mem::replace(&mut entry.translation, text.clone());
            composite.push(UndoAction::translation(key.clone(), old_text, text));
            composite.push(UndoAction::status(key.clone(), old_status, new_status));
            changed.push(key.clone());
        }

        if changed.is_empty() {
            return Ok(CommitOutcome::default());
        }

        self.undo_stack.push(composite);
        self.refresh_entries(&changed);

        tracing::debug!("已提交 {} 个条目的译文", changed.len());
        let advance_to = keys.last().and_then(|last| self.next_translatable(last));
        Ok(CommitOutcome { changed, advance_to })
    }

    /// 同一文件中 `key` 之后的下一个可翻译条目
    pub fn next_translatable(&self, key: &EntryKey) -> Option<EntryKey> {
        let entries = self.entries(key.file())?;
        let position = entries.iter().position(|e| e.entry_id == key.entry_id)?;
        entries[position + 1..]
            .iter()
            .find(|e| e.is_translatable())
            .map(|e| EntryKey::new(key.file.clone(), e.entry_id.clone()))
    }

    /// 撤销最后一次修改
    ///
    /// # 返回
    /// 受影响的条目
    pub fn undo(&mut self) -> Vec<EntryKey> {
        let touched = self.undo_stack.undo(&mut self.files);
        self.refresh_entries(&touched);
        touched
    }

    /// 重做最后一次撤销
    pub fn redo(&mut self) -> Vec<EntryKey> {
        let touched = self.undo_stack.redo(&mut self.files);
        self.refresh_entries(&touched);
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::parsers::{KirikiriParser, ScriptParser};

    const SCENE: &str = "<Ann>\"Hi there\"\n\nNarration one\nNarration two\n";

    fn project() -> Project {
        let mut project = Project::new(ProjectConfig::new("p", ".", "kirikiri", "en"));
        project.add_file("scene.ks", KirikiriParser::new().parse_text(SCENE).unwrap());
        project
    }

    fn key(id: &str) -> EntryKey {
        EntryKey::new("scene.ks", id)
    }

    #[test]
    fn test_single_commit() {
        let mut project = project();
        let outcome = project.commit_translation(&[key("1")], "  Olá  \n").unwrap();

        assert_eq!(outcome.changed, vec![key("1")]);
        assert_eq!(outcome.advance_to, Some(key("3")));

        let entry = project.entry(&key("1")).unwrap();
        assert_eq!(entry.translation, "Olá");
        assert_eq!(entry.status, TranslationStatus::Translated);
        assert!(project.file_has_translation(std::path::Path::new("scene.ks")));
        assert_eq!(project.undo_stack().len(), 1);
    }

    #[test]
    fn test_structural_entry_rejects_translation() {
        let mut project = project();

        let err = project.commit_translation(&[key("raw-2")], "Oops").err().unwrap();
        assert!(matches!(err, SekaiError::NotTranslatable(_)));
        let err = project
            .commit_translation(&[key("1"), key("raw-2")], "A\n\nB")
            .err()
            .unwrap();
        assert!(matches!(err, SekaiError::NotTranslatable(_)));
        let err = project.edit_text(&key("raw-2"), "Oops").err().unwrap();
        assert!(matches!(err, SekaiError::NotTranslatable(_)));

        let entry = project.entry(&key("raw-2")).unwrap();
        assert!(entry.translation.is_empty());
        assert_eq!(entry.status, TranslationStatus::Untranslated);
        assert!(project.entry(&key("1")).unwrap().translation.is_empty());
        assert!(!project.undo_stack().can_undo());
        assert!(!project.file_has_translation(std::path::Path::new("scene.ks")));
    }

    #[test]
    fn test_blank_commit_is_noop() {
        let mut project = project();
        let outcome = project.commit_translation(&[key("1")], "  \n ").unwrap();
        assert!(outcome.is_noop());
        assert!(!project.undo_stack().can_undo());
    }

    #[test]
    fn test_same_text_is_noop() {
        let mut project = project();
        project.commit_translation(&[key("1")], "Olá").unwrap();
        let outcome = project.commit_translation(&[key("1")], "Olá").unwrap();
        assert!(outcome.is_noop());
        assert_eq!(project.undo_stack().len(), 1);
    }

    #[test]
    fn test_batch_blocks_map_in_order() {
        let mut project = project();
        let keys = [key("3"), key("4")];
        let outcome = project
            .commit_translation(&keys, "Narração um\n\nNarração dois")
            .unwrap();

        assert_eq!(outcome.changed.len(), 2);
        assert_eq!(outcome.advance_to, None);
        assert_eq!(project.entry(&key("3")).unwrap().translation, "Narração um");
        assert_eq!(project.entry(&key("4")).unwrap().translation, "Narração dois");

        // 整批一次撤销
        let touched = project.undo();
        assert_eq!(touched.len(), 2);
        assert_eq!(project.entry(&key("3")).unwrap().translation, "");
        assert_eq!(project.entry(&key("4")).unwrap().status, TranslationStatus::Untranslated);
    }

    #[test]
    fn test_batch_single_block_applies_to_all() {
        let mut project = project();
        project.commit_translation(&[key("3"), key("4")], "Mesmo").unwrap();
        assert_eq!(project.entry(&key("3")).unwrap().translation, "Mesmo");
        assert_eq!(project.entry(&key("4")).unwrap().translation, "Mesmo");
    }

    #[test]
    fn test_batch_refuses_overwrite() {
        let mut project = project();
        project.commit_translation(&[key("3")], "Já").unwrap();

        let err = project
            .commit_translation(&[key("3"), key("4")], "a\n\nb")
            .err()
            .unwrap();
        assert!(matches!(err, SekaiError::BatchOverwrite));
    }

    #[test]
    fn test_batch_block_count_mismatch() {
        let mut project = project();
        let err = project
            .commit_translation(&[key("1"), key("3"), key("4")], "a\n\nb")
            .err()
            .unwrap();
        match err {
            SekaiError::BlockCountMismatch { blocks, entries } => {
                assert_eq!((blocks, entries), (2, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!project.undo_stack().can_undo());
    }

    #[test]
    fn test_unknown_key() {
        let mut project = project();
        let err = project.commit_translation(&[key("99")], "x").err().unwrap();
        assert!(matches!(err, SekaiError::UnknownEntry(_)));
    }

    #[test]
    fn test_edit_text_sets_in_progress() {
        let mut project = project();
        assert!(project.edit_text(&key("1"), "Ol").unwrap());
        assert_eq!(project.entry(&key("1")).unwrap().status, TranslationStatus::InProgress);

        project.undo();
        let entry = project.entry(&key("1")).unwrap();
        assert_eq!(entry.translation, "");
        assert_eq!(entry.status, TranslationStatus::Untranslated);

        project.redo();
        assert_eq!(project.entry(&key("1")).unwrap().translation, "Ol");
    }

    #[test]
    fn test_undo_refreshes_qa() {
        let mut project = Project::new(ProjectConfig::new("p", ".", "kirikiri", "en"));
        project.add_file(
            "scene.ks",
            KirikiriParser::new().parse_text("<Ann>\"Hi {name}\"\n").unwrap(),
        );

        project.commit_translation(&[key("1")], "Oi").unwrap();
        assert_eq!(project.entry(&key("1")).unwrap().qa_issues[0].code, "MISSING_TAG");

        project.undo();
        assert!(project.entry(&key("1")).unwrap().qa_issues.is_empty());
    }

    #[test]
    fn test_split_blocks() {
        assert_eq!(split_blocks("a\nb\n\n  \nc"), vec!["a\nb", "c"]);
        assert_eq!(split_blocks("one"), vec!["one"]);
    }
}
