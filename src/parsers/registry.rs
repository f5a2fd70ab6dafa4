/// 解析器注册表
///
/// 由调用方显式构造的 `(引擎名, 构造函数)` 表，按声明顺序匹配，
/// 第一个引擎名相同且 `can_parse` 接受文件的解析器胜出。
use std::path::Path;

use super::{ArtemisParser, KirikiriParser, ScriptParser, SiglusParser};
use crate::config::ProjectConfig;
use crate::utils::{Result, SekaiError};

/// 语言代码别名表
const LANG_ALIASES: &[(&str, &str)] = &[
    ("jp", "ja"),
    ("jpn", "ja"),
    ("ja", "ja"),
    ("en", "en"),
    ("eng", "en"),
    ("cn", "cn"),
    ("zh", "cn"),
    ("chi", "cn"),
];

/// 规范化语言代码
///
/// 空值回退为 `en`，未知代码转小写后原样返回。
pub fn normalize_language(lang: &str) -> String {
    let lang = lang.trim();
    if lang.is_empty() {
        return "en".to_string();
    }

    let lowered = lang.to_lowercase();
    LANG_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lowered)
}

pub type ParserConstructor = fn() -> Box<dyn ScriptParser>;

#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: Vec<(&'static str, ParserConstructor)>,
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.engines()).finish()
    }
}

impl ParserRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置解析器：artemis、kirikiri、siglus
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register(super::artemis::ENGINE_NAME, || Box::new(ArtemisParser::new()))
            .register(super::kirikiri::ENGINE_NAME, || Box::new(KirikiriParser::new()))
            .register(super::siglus::ENGINE_NAME, || Box::new(SiglusParser::new()));
        registry
    }

    /// 追加一个解析器，匹配时引擎名忽略大小写
    pub fn register(&mut self, engine: &'static str, constructor: ParserConstructor) -> &mut Self {
        self.parsers.push((engine, constructor));
        self
    }

    /// 已注册的引擎名（按声明顺序）
    pub fn engines(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.parsers.iter().map(|(engine, _)| *engine)
    }

    /// 为文件选择解析器并绑定规范化后的语言
    pub fn get_parser(&self, path: &Path, config: &ProjectConfig) -> Result<Box<dyn ScriptParser>> {
        let engine = config.engine.trim().to_lowercase();
        let language = normalize_language(&config.language);

        for (name, constructor) in &self.parsers {
            if !name.eq_ignore_ascii_case(&engine) {
                continue;
            }

            let mut parser = constructor();
            if parser.can_parse(path) {
                parser.set_language(&language);
                return Ok(parser);
            }
        }

        Err(SekaiError::NoParser {
            engine,
            path: path.to_path_buf(),
        })
    }
}
