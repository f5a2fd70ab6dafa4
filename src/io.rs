/// IO 抽象层模块
///
/// 该模块提供了脚本文件读写的抽象接口，遵循依赖倒置原则。
/// 支持依赖注入、测试 mock 和替换 IO 实现（如内存 IO）。
///
/// # 架构设计
///
/// - **traits**: 定义 Reader/Writer trait 接口
/// - **script_io**: 基于文件系统的默认实现
/// - **encoding**: 编码解码与保留换行符的切行
///
/// # 使用示例
///
/// ```rust,ignore
/// use sekai_translator::io::{DefaultScriptReader, ScriptReader};
///
/// let reader = DefaultScriptReader;
/// let script = reader.read(Path::new("scene01.ks"), "shift_jis")?;
/// ```
pub mod encoding;
pub mod script_io;
pub mod traits;

// === 导出 trait 定义 ===
pub use traits::{ScriptReader, ScriptText, ScriptWriter};

// === 导出默认实现 ===
pub use script_io::{DefaultScriptReader, DefaultScriptWriter};

pub use encoding::{decode, encode, split_lines, ScriptLine};
