use std::path::PathBuf;

use serde_json::{Map, Value};

/// 一个待分析的文本文件
#[derive(Debug, Clone)]
pub struct AnalysisTask {
    /// 源文件路径
    pub source_path: PathBuf,
    /// 文件全文
    pub raw_text: String,
}

impl AnalysisTask {
    pub fn new(source_path: impl Into<PathBuf>, raw_text: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            raw_text: raw_text.into(),
        }
    }

    /// 日志中显示的文件名
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// 一条梗分析结果
///
/// 字段名 → 值（字符串、字符串数组或 null）的松散映射，
/// 新旧两代字段命名可能同时存在，由 `RecordExtractor` 统一读取。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisRecord {
    fields: Map<String, Value>,
}

impl AnalysisRecord {
    /// 解析 JSON 文本，顶层必须是对象
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self { fields })
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for AnalysisRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
