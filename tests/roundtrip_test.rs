//! 往返一致性集成测试
//!
//! 解析后不做任何修改直接重建，输出必须与源文件逐字节相同：
//! - LF / CRLF / 无结尾换行
//! - UTF-8 BOM
//! - Shift_JIS 编码
//! - 再次解析重建结果得到相同的条目

use std::path::{Path, PathBuf};
use sekai_translator::io::encode;
use sekai_translator::{ParserRegistry, Project, ProjectConfig};

const ARTEMIS: &str = "astver = 2.0\n\
ast = {\n\
block_00000 = {\n\
\ttext = {\n\
\t\tja = {\n\
\t\t\t\"こんにちは\",\n\
\t\t},\n\
\t\ten = {\n\
\t\t\t\"Hello\",\n\
\t\t\t[[Good {time}]],\n\
\t\t},\n\
\t},\n\
},\n\
}\n";

const KIRIKIRI: &str = "*start\n<Ann>\"Hi there\"\n\n@bg storage=room\nThe rain kept falling.\n<Ann>(Cold...)\n";

const SIGLUS: &str = "○001○\"Hi\"\n●001●\"Hi\"\n\n○002○ナレーション\n●002●ナレーション\n";

fn write_script(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// 导入后原样导出，返回输出文件内容
fn roundtrip(path: &Path, engine: &str, language: &str, encoding: &str) -> Vec<u8> {
    let config = ProjectConfig::new("test", path.parent().unwrap(), engine, language).with_encoding(encoding);
    let registry = ParserRegistry::builtin();
    let mut project = Project::new(config);
    project.import_file(&registry, path).expect("应该能够解析脚本");

    let output = project.export_file(&registry, path, "_rebuilt").expect("应该能够重建脚本");
    std::fs::read(output).unwrap()
}

#[test]
fn test_artemis_roundtrip_lf() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(dir.path(), "scene.ast", ARTEMIS.as_bytes());
    assert_eq!(roundtrip(&path, "artemis", "en", "utf-8"), ARTEMIS.as_bytes());
}

#[test]
fn test_all_engines_roundtrip_crlf() {
    let dir = tempfile::tempdir().unwrap();
    for (name, engine, source) in [
        ("scene.ast", "artemis", ARTEMIS),
        ("scene.ks", "kirikiri", KIRIKIRI),
        ("scene.txt", "siglus", SIGLUS),
    ] {
        let crlf = source.replace('\n', "\r\n");
        let path = write_script(dir.path(), name, crlf.as_bytes());
        assert_eq!(
            roundtrip(&path, engine, "en", "utf-8"),
            crlf.as_bytes(),
            "{} 的 CRLF 往返失败",
            engine
        );
    }
}

#[test]
fn test_roundtrip_without_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    for (name, engine, source) in [
        ("scene.ks", "kirikiri", KIRIKIRI),
        ("scene.txt", "siglus", SIGLUS),
    ] {
        let trimmed = source.trim_end_matches('\n');
        let path = write_script(dir.path(), name, trimmed.as_bytes());
        assert_eq!(roundtrip(&path, engine, "en", "utf-8"), trimmed.as_bytes());
    }
}

#[test]
fn test_roundtrip_keeps_utf8_bom() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(KIRIKIRI.as_bytes());
    let path = write_script(dir.path(), "bom.ks", &bytes);

    assert_eq!(roundtrip(&path, "kirikiri", "en", "utf-8-sig"), bytes);
}

#[test]
fn test_roundtrip_shift_jis() {
    let dir = tempfile::tempdir().unwrap();
    let source = "<アン>\"こんにちは\"\r\n地の文です。\r\n";
    let bytes = encode(source, "cp932").unwrap();
    let path = write_script(dir.path(), "sjis.ks", &bytes);

    let output = roundtrip(&path, "kirikiri", "ja", "shift_jis");
    assert_eq!(output, bytes);
}

#[test]
fn test_rebuild_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(dir.path(), "scene.ks", KIRIKIRI.as_bytes());
    let registry = ParserRegistry::builtin();

    let mut project = Project::new(ProjectConfig::new("test", dir.path(), "kirikiri", "en"));
    project.import_file(&registry, &path).unwrap();
    let first = project.export_file(&registry, &path, "_1").unwrap();

    let mut again = Project::new(ProjectConfig::new("test", dir.path(), "kirikiri", "en"));
    again.import_file(&registry, &first).unwrap();
    let second = again.export_file(&registry, &first, "_2").unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    assert_eq!(
        project.entries(&path).unwrap().len(),
        again.entries(&first).unwrap().len()
    );
}

#[test]
fn test_output_path_beside_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(dir.path(), "first.ks", KIRIKIRI.as_bytes());
    let registry = ParserRegistry::builtin();

    let mut project = Project::new(ProjectConfig::new("test", dir.path(), "kirikiri", "en"));
    project.import_file(&registry, &path).unwrap();
    let output = project.export_file(&registry, &path, ".pt").unwrap();

    assert_eq!(output, dir.path().join("first.pt.ks"));
}
