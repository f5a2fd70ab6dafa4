/// 脚本文件 IO 实现
///
/// 提供基于文件系统的默认读写实现
use std::path::Path;

use super::encoding::{decode, encode};
use super::traits::{ScriptReader, ScriptText, ScriptWriter};
use crate::utils::Result;

/// 默认的脚本读取器（基于 std::fs）
#[derive(Debug, Clone, Default)]
pub struct DefaultScriptReader;

impl ScriptReader for DefaultScriptReader {
    fn read(&self, path: &Path, encoding: &str) -> Result<ScriptText> {
        let bytes = std::fs::read(path)?;
        let (text, had_errors) = decode(&bytes, encoding)?;
        Ok(ScriptText { text, had_errors })
    }
}

/// 默认的脚本写入器（基于 std::fs）
///
/// 先写入同目录下的临时文件，再重命名覆盖目标文件。
#[derive(Debug, Clone, Default)]
pub struct DefaultScriptWriter;

impl ScriptWriter for DefaultScriptWriter {
    fn write(&self, text: &str, path: &Path, encoding: &str) -> Result<()> {
        let bytes = encode(text, encoding)?;

        // 确保父目录存在
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = std::path::PathBuf::from(tmp_name);

        std::fs::write(&tmp_path, &bytes)?;
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}
