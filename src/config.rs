/// 项目描述配置
///
/// 描述文件本身由外部（项目管理层）持久化，这里只负责读取与默认值。
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::Result;

fn default_name() -> String {
    "Projeto".to_string()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_engine() -> String {
    "artemis".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub id: String,
    #[serde(default = "default_name")]
    pub name: String,
    pub root_path: PathBuf,
    /// 脚本文件编码标签
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// 目标语言（未规范化，由注册表规范化）
    #[serde(default = "default_language")]
    pub language: String,
    /// 引擎名称
    #[serde(default = "default_engine")]
    pub engine: String,
    /// 导出覆盖旧文件前是否先创建带时间戳的备份
    #[serde(default)]
    pub backup_exports: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: default_name(),
            root_path: PathBuf::new(),
            encoding: default_encoding(),
            language: default_language(),
            engine: default_engine(),
            backup_exports: false,
        }
    }
}

impl ProjectConfig {
    pub fn new(id: impl Into<String>, root_path: impl Into<PathBuf>, engine: &str, language: &str) -> Self {
        Self {
            id: id.into(),
            root_path: root_path.into(),
            engine: engine.to_string(),
            language: language.to_string(),
            ..Self::default()
        }
    }

    /// 从 JSON 描述文件读取
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 链式设置编码
    pub fn with_encoding(mut self, encoding: &str) -> Self {
        self.encoding = encoding.to_string();
        self
    }
}
