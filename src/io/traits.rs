/// IO 抽象层 - trait 定义
///
/// 该模块定义了脚本文件读写的抽象接口，支持依赖注入和测试 mock。
/// 解析器与重建逻辑只面向这两个 trait，不直接接触文件系统。

use std::path::Path;

use crate::utils::Result;

/// 已解码的脚本文本
#[derive(Debug, Clone)]
pub struct ScriptText {
    /// 解码后的完整文本（含原换行符与 BOM）
    pub text: String,
    /// 解码时是否发生了字符替换
    pub had_errors: bool,
}

/// 脚本读取 trait
///
/// # 职责
/// - 读取脚本文件并按给定编码解码
/// - 不负责解析，仅负责 IO
pub trait ScriptReader {
    /// 读取并解码脚本文件
    ///
    /// # 参数
    /// * `path` - 文件路径
    /// * `encoding` - 编码标签（如 "utf-8"、"shift_jis"）
    fn read(&self, path: &Path, encoding: &str) -> Result<ScriptText>;
}

/// 脚本写入 trait
///
/// # 职责
/// - 将重建后的文本编码并写入文件系统
/// - 不负责序列化，仅负责 IO
pub trait ScriptWriter {
    /// 编码并写入脚本文件
    ///
    /// # 参数
    /// * `text` - 要写入的文本
    /// * `path` - 目标文件路径
    /// * `encoding` - 编码标签
    fn write(&self, text: &str, path: &Path, encoding: &str) -> Result<()>;
}
