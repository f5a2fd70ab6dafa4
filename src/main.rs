use clap::Parser;
use std::path::{Path, PathBuf};
use sekai_translator::{
    EntryKey, ParserRegistry, Project, ProjectConfig, ScriptDebugger, TranslationRecord,
    SUPPORTED_ENGINES,
};

#[derive(Parser)]
#[command(name = "sekai_translator")]
#[command(about = "从视觉小说脚本中提取、应用并重建可翻译文本")]
#[command(version)]
struct Cli {
    /// 输入脚本文件路径
    #[arg(short, long)]
    input: PathBuf,

    /// 输出JSON文件路径
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 项目描述文件(JSON)
    #[arg(long)]
    project: Option<PathBuf>,

    /// 引擎名称(artemis / kirikiri / siglus)
    #[arg(long)]
    engine: Option<String>,

    /// 目标语言
    #[arg(long)]
    language: Option<String>,

    /// 脚本文件编码
    #[arg(long)]
    encoding: Option<String>,

    /// 重建文件名后缀
    #[arg(long, default_value = ".pt")]
    suffix: String,

    /// 应用翻译模式：从翻译JSON文件应用翻译并重建脚本
    #[arg(long)]
    apply_translations: Option<PathBuf>,

    /// 显示翻译进度统计
    #[arg(long)]
    stats: bool,

    /// 输出QA检查结果
    #[arg(long)]
    qa: bool,

    /// 写出状态报告JSON
    #[arg(long)]
    status_report: Option<PathBuf>,

    /// 覆盖旧的重建文件前先创建备份
    #[arg(long)]
    backup: bool,

    /// 测试模式：解析文件后直接重建，用于验证解析和重建逻辑
    #[arg(long)]
    test_rebuild: bool,

    /// 对比输入文件与另一个脚本文件
    #[arg(long)]
    compare_files: Option<PathBuf>,

    /// 静默模式(仅输出错误)
    #[arg(long)]
    quiet: bool,

    /// 输出调试日志
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli);

    validate_input(&cli.input)?;
    let config = build_config(&cli)?;

    if let Some(other) = &cli.compare_files {
        return handle_file_comparison(&cli, &config, other);
    }

    let registry = ParserRegistry::builtin();
    let mut project = Project::new(config);
    let count = project.import_file(&registry, &cli.input)?;

    if !cli.quiet {
        println!("已解析 {:?}: {} 个条目", cli.input, count);
    }

    if cli.test_rebuild {
        return handle_test_rebuild(&cli, &registry, &project);
    }

    if let Some(translation_file) = &cli.apply_translations {
        return handle_translation_application(&cli, &registry, &mut project, translation_file);
    }

    if cli.qa {
        return handle_qa_report(&cli, &project);
    }

    if cli.stats || cli.status_report.is_some() {
        return handle_stats(&cli, &project);
    }

    // 默认模式：提取译文交换JSON
    handle_extraction(&cli, &project)
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };

    let _ = tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

/// 验证输入文件
fn validate_input(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("输入文件不存在: {:?}", input).into());
    }
    Ok(())
}

/// 项目描述文件为基础，命令行参数覆盖
fn build_config(cli: &Cli) -> Result<ProjectConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.project {
        Some(path) => ProjectConfig::load(path)?,
        None => {
            let root = cli.input.parent().map(Path::to_path_buf).unwrap_or_default();
            ProjectConfig {
                id: "cli".to_string(),
                root_path: root,
                ..ProjectConfig::default()
            }
        }
    };

    if let Some(engine) = &cli.engine {
        config.engine = engine.clone();
    }
    if let Some(language) = &cli.language {
        config.language = language.clone();
    }
    if let Some(encoding) = &cli.encoding {
        config.encoding = encoding.clone();
    }
    if cli.backup {
        config.backup_exports = true;
    }

    let engine = config.engine.to_lowercase();
    if !SUPPORTED_ENGINES.contains(&engine.as_str()) {
        return Err(format!(
            "不支持的引擎: {} (可选: {})",
            config.engine,
            SUPPORTED_ENGINES.join(", ")
        )
        .into());
    }

    Ok(config)
}

/// 获取输出文件路径
fn get_output_path(cli: &Cli) -> PathBuf {
    cli.output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("json"))
}

/// 处理译文提取
fn handle_extraction(cli: &Cli, project: &Project) -> Result<(), Box<dyn std::error::Error>> {
    let records: Vec<TranslationRecord> = project
        .entries(&cli.input)
        .unwrap_or_default()
        .iter()
        .filter(|e| e.is_translatable())
        .map(TranslationRecord::from)
        .collect();

    let output_path = get_output_path(cli);
    let json = serde_json::to_string_pretty(&records)?;
    std::fs::write(&output_path, json)?;

    if !cli.quiet {
        println!("提取了 {} 个可翻译条目", records.len());
        println!("结果已保存到: {:?}", output_path);
    }
    Ok(())
}

/// 处理翻译应用
fn handle_translation_application(
    cli: &Cli,
    registry: &ParserRegistry,
    project: &mut Project,
    translation_file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if !translation_file.exists() {
        return Err(format!("翻译文件不存在: {:?}", translation_file).into());
    }

    let json = std::fs::read_to_string(translation_file)
        .map_err(|e| format!("读取翻译文件失败: {}", e))?;
    let records: Vec<TranslationRecord> =
        serde_json::from_str(&json).map_err(|e| format!("解析翻译JSON失败: {}", e))?;

    let mut applied = 0;
    let mut skipped = 0;
    for record in &records {
        if record.translation.trim().is_empty() {
            continue;
        }
        let key = EntryKey::new(cli.input.clone(), record.entry_id.clone());
        match project.commit_translation(&[key], &record.translation) {
            Ok(outcome) => applied += outcome.changed.len(),
            Err(e) => {
                skipped += 1;
                tracing::warn!("跳过条目 {}: {}", record.entry_id, e);
            }
        }
    }

    if !cli.quiet {
        println!("应用了 {} 条翻译，跳过 {} 条", applied, skipped);
    }

    let output_path = project.export_file(registry, &cli.input, &cli.suffix)?;
    if !cli.quiet {
        println!("重建文件已保存到: {:?}", output_path);
    }
    Ok(())
}

/// 处理QA报告
fn handle_qa_report(cli: &Cli, project: &Project) -> Result<(), Box<dyn std::error::Error>> {
    let entries = project.entries(&cli.input).unwrap_or_default();
    let mut errors = 0;
    let mut warnings = 0;

    for entry in entries {
        for issue in &entry.qa_issues {
            if issue.is_error() {
                errors += 1;
            } else {
                warnings += 1;
            }
            println!("[{}] {}", entry.entry_id, issue);
        }
    }

    if !cli.quiet {
        println!("QA检查完成: {} 个错误, {} 个警告", errors, warnings);
    }

    if errors > 0 {
        return Err(format!("存在 {} 个QA错误", errors).into());
    }
    Ok(())
}

/// 处理统计与状态报告
fn handle_stats(cli: &Cli, project: &Project) -> Result<(), Box<dyn std::error::Error>> {
    if cli.stats {
        println!("{}", project.project_stats());
        println!("文件进度: {}%", project.file_progress(&cli.input));
    }

    if let Some(report_path) = &cli.status_report {
        project.export_status_report(report_path)?;
        if !cli.quiet {
            println!("状态报告已保存到: {:?}", report_path);
        }
    }
    Ok(())
}

/// 处理测试重建模式
fn handle_test_rebuild(
    cli: &Cli,
    registry: &ParserRegistry,
    project: &Project,
) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.quiet {
        println!("测试模式：解析并重建文件 {:?}", cli.input);
    }

    let rebuilt = project.export_file(registry, &cli.input, &cli.suffix)?;
    let report = get_output_path(cli).with_extension("compare.txt");
    let differences =
        ScriptDebugger::compare_files(&cli.input, &rebuilt, &project.config.encoding, &report)?;

    if !cli.quiet {
        println!("测试完成，重建文件输出到: {:?}", rebuilt);
        println!("对比报告: {:?}", report);
    }

    if differences > 0 {
        return Err(format!("重建结果与原文件存在 {} 处差异", differences).into());
    }
    if !cli.quiet {
        println!("✓ 重建结果与原文件一致");
    }
    Ok(())
}

/// 处理文件对比
fn handle_file_comparison(
    cli: &Cli,
    config: &ProjectConfig,
    other: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("compare.txt"));
    let differences = ScriptDebugger::compare_files(&cli.input, other, &config.encoding, &report)?;

    if !cli.quiet {
        println!("对比完成: {} 处差异", differences);
        println!("结果已保存到: {:?}", report);
    }
    Ok(())
}
