/// 翻译进度统计
///
/// 只统计可翻译条目；`Reviewed` 单独计数，不计入进度百分比。
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::entry::{TranslationEntry, TranslationStatus};
use crate::project::Project;
use crate::utils::Result;

/// 单个文件的统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    pub name: String,
    pub total: usize,
    pub translated: usize,
    pub reviewed: usize,
    pub in_progress: usize,
    /// 百分比，保留一位小数
    pub progress: f64,
}

/// 项目统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total: usize,
    pub translated: usize,
    pub reviewed: usize,
    pub in_progress: usize,
    pub untranslated: usize,
    pub progress: f64,
    #[serde(skip)]
    pub files: Vec<FileStats>,
}

impl std::fmt::Display for ProjectStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== 项目统计信息 ===")?;
        writeln!(f, "可翻译条目: {}", self.total)?;
        writeln!(f, "已翻译: {}", self.translated)?;
        writeln!(f, "已校对: {}", self.reviewed)?;
        writeln!(f, "翻译中: {}", self.in_progress)?;
        writeln!(f, "未翻译: {}", self.untranslated)?;
        writeln!(f, "进度: {:.1}%", self.progress)?;
        for file in &self.files {
            writeln!(
                f,
                "  {}: {}/{} ({:.1}%)",
                file.name, file.translated, file.total, file.progress
            )?;
        }
        Ok(())
    }
}

/// 机器可读的状态报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStatusReport {
    pub project_id: String,
    pub name: String,
    pub engine: String,
    pub language: String,
    /// RFC 3339 时间戳（UTC）
    pub updated_at: String,
    pub stats: ProjectStats,
    /// 相对项目根目录的路径 -> 文件统计
    pub files: BTreeMap<String, FileStats>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(part as f64 / total as f64 * 100.0)
    }
}

fn count_status(entries: &[&TranslationEntry], status: TranslationStatus) -> usize {
    entries.iter().filter(|e| e.status == status).count()
}

/// 相对项目根目录的路径，以 `/` 分隔；不在根目录下时使用完整路径
fn report_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_stats(name: String, entries: &[TranslationEntry]) -> Option<FileStats> {
    let translatable: Vec<&TranslationEntry> =
        entries.iter().filter(|e| e.is_translatable()).collect();
    if translatable.is_empty() {
        return None;
    }

    let total = translatable.len();
    let translated = count_status(&translatable, TranslationStatus::Translated);
    Some(FileStats {
        name,
        total,
        translated,
        reviewed: count_status(&translatable, TranslationStatus::Reviewed),
        in_progress: count_status(&translatable, TranslationStatus::InProgress),
        progress: percentage(translated, total),
    })
}

impl Project {
    /// 文件进度（0–100，向下取整），仅统计可翻译条目中的 `Translated`
    pub fn file_progress(&self, path: &Path) -> u8 {
        let Some(entries) = self.files.entries(path) else {
            return 0;
        };

        let total = entries.iter().filter(|e| e.is_translatable()).count();
        if total == 0 {
            return 0;
        }
        let translated = entries
            .iter()
            .filter(|e| e.is_translatable() && e.status == TranslationStatus::Translated)
            .count();

        (translated * 100 / total) as u8
    }

    /// 更新单个文件的状态缓存（是否已有译文）
    pub fn update_file_status(&mut self, path: &Path) {
        let has_translated = self
            .files
            .entries(path)
            .map(|entries| entries.iter().any(|e| e.status == TranslationStatus::Translated))
            .unwrap_or(false);
        self.file_status_cache.insert(path.to_path_buf(), has_translated);
    }

    /// 重新计算全部文件的状态缓存
    pub fn rebuild_all_file_status(&mut self) {
        self.file_status_cache.clear();
        let paths: Vec<_> = self.files.paths().map(Path::to_path_buf).collect();
        for path in paths {
            self.update_file_status(&path);
        }
    }

    /// 查询状态缓存
    pub fn file_has_translation(&self, path: &Path) -> bool {
        self.file_status_cache.get(path).copied().unwrap_or(false)
    }

    /// 汇总项目统计
    pub fn project_stats(&self) -> ProjectStats {
        let files: Vec<FileStats> = self
            .files
            .iter()
            .filter_map(|(path, entries)| {
                file_stats(report_name(&self.config.root_path, path), entries)
            })
            .collect();

        let total: usize = files.iter().map(|f| f.total).sum();
        let translated: usize = files.iter().map(|f| f.translated).sum();
        let reviewed: usize = files.iter().map(|f| f.reviewed).sum();
        let in_progress: usize = files.iter().map(|f| f.in_progress).sum();

        ProjectStats {
            total,
            translated,
            reviewed,
            in_progress,
            untranslated: total - translated - reviewed,
            progress: percentage(translated, total),
            files,
        }
    }

    /// 构建状态报告
    pub fn build_status_report(&self) -> ProjectStatusReport {
        let stats = self.project_stats();
        let files = stats
            .files
            .iter()
            .map(|f| (f.name.clone(), f.clone()))
            .collect();

        ProjectStatusReport {
            project_id: self.config.id.clone(),
            name: self.config.name.clone(),
            engine: self.config.engine.clone(),
            language: self.config.language.clone(),
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            stats,
            files,
        }
    }

    /// 将状态报告写为格式化 JSON
    pub fn export_status_report(&self, output: &Path) -> Result<ProjectStatusReport> {
        let report = self.build_status_report();
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(output, json)?;

        tracing::info!(
            "已写入状态报告 {} ({:.1}%)",
            output.display(),
            report.stats.progress
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::editor::EntryStore;
    use crate::entry::EntryKey;
    use crate::parsers::{KirikiriParser, ScriptParser};

    fn project(text: &str) -> Project {
        let mut project = Project::new(ProjectConfig::new("demo", ".", "kirikiri", "en"));
        project.add_file("scene.ks", KirikiriParser::new().parse_text(text).unwrap());
        project
    }

    fn set_status(project: &mut Project, id: &str, status: TranslationStatus) {
        let entry = project
            .files
            .entry_mut(&EntryKey::new("scene.ks", id))
            .unwrap();
        entry.translation = "x".to_string();
        entry.status = status;
    }

    #[test]
    fn test_file_progress_floors() {
        let mut project = project("a\nb\nc\n\n");
        let path = Path::new("scene.ks");
        assert_eq!(project.file_progress(path), 0);

        set_status(&mut project, "1", TranslationStatus::Translated);
        assert_eq!(project.file_progress(path), 33);

        set_status(&mut project, "2", TranslationStatus::Reviewed);
        assert_eq!(project.file_progress(path), 33);

        set_status(&mut project, "3", TranslationStatus::Translated);
        assert_eq!(project.file_progress(path), 66);
    }

    #[test]
    fn test_file_progress_without_translatable_entries() {
        let project = project("\n\n");
        assert_eq!(project.file_progress(Path::new("scene.ks")), 0);
        assert_eq!(project.file_progress(Path::new("missing.ks")), 0);
    }

    #[test]
    fn test_file_status_cache() {
        let mut project = project("a\nb\n");
        let path = Path::new("scene.ks");
        assert!(!project.file_has_translation(path));

        set_status(&mut project, "1", TranslationStatus::Translated);
        project.update_file_status(path);
        assert!(project.file_has_translation(path));

        set_status(&mut project, "1", TranslationStatus::InProgress);
        project.rebuild_all_file_status();
        assert!(!project.file_has_translation(path));
    }

    #[test]
    fn test_project_stats() {
        let mut project = project("a\nb\nc\n");
        project.add_file("empty.ks", KirikiriParser::new().parse_text("\n").unwrap());
        set_status(&mut project, "1", TranslationStatus::Translated);
        set_status(&mut project, "2", TranslationStatus::Reviewed);

        let stats = project.project_stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.translated, 1);
        assert_eq!(stats.reviewed, 1);
        assert_eq!(stats.untranslated, 1);
        assert_eq!(stats.progress, 33.3);
        assert_eq!(stats.files.len(), 1);
        assert!(stats.to_string().contains("scene.ks: 1/3"));
    }

    #[test]
    fn test_report_keys_keep_same_named_files_apart() {
        let mut project = Project::new(ProjectConfig::new("demo", "game", "kirikiri", "en"));
        let parser = KirikiriParser::new();
        project.add_file("game/a/scene.ks", parser.parse_text("a\n").unwrap());
        project.add_file("game/b/scene.ks", parser.parse_text("b\nc\n").unwrap());
        project.add_file("elsewhere/x.ks", parser.parse_text("d\n").unwrap());

        let report = project.build_status_report();
        assert_eq!(report.files.len(), 3);
        assert_eq!(report.files["a/scene.ks"].total, 1);
        assert_eq!(report.files["b/scene.ks"].total, 2);
        assert_eq!(report.files["elsewhere/x.ks"].total, 1);
    }

    #[test]
    fn test_status_report() {
        let mut project = project("a\nb\n");
        set_status(&mut project, "1", TranslationStatus::Translated);

        let report = project.build_status_report();
        assert_eq!(report.project_id, "demo");
        assert_eq!(report.engine, "kirikiri");
        assert_eq!(report.stats.progress, 50.0);
        assert_eq!(report.files["scene.ks"].translated, 1);
        assert!(chrono::DateTime::parse_from_rfc3339(&report.updated_at).is_ok());
    }
}
