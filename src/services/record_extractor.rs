//! 容错字段读取
//!
//! 从松散的分析记录中按字段名读取字符串值，缺失、null、空串、空数组
//! 一律返回 `NO_INFO`，从不报错。

use serde_json::Value;

use crate::models::{AnalysisRecord, ColumnSpec, CsvSchema};

/// 缺失值占位符
pub const NO_INFO: &str = "정보 없음";

/// 字段读取器，数组分隔符由导出结构决定
#[derive(Debug, Clone, Copy)]
pub struct RecordExtractor {
    separator: &'static str,
}

impl RecordExtractor {
    pub fn new(separator: &'static str) -> Self {
        Self { separator }
    }

    pub fn for_schema(schema: CsvSchema) -> Self {
        Self::new(schema.array_separator())
    }

    /// 读取单个字段
    pub fn get(&self, record: &AnalysisRecord, field: &str) -> String {
        match present(record, field) {
            Some(value) => self.text_or_no_info(value),
            None => NO_INFO.to_string(),
        }
    }

    /// 先读新字段名，缺失或为 null 时再读旧字段名
    pub fn get_with_alias(&self, record: &AnalysisRecord, new_name: &str, legacy_name: &str) -> String {
        match present(record, new_name).or_else(|| present(record, legacy_name)) {
            Some(value) => self.text_or_no_info(value),
            None => NO_INFO.to_string(),
        }
    }

    /// 读取数组字段并拼接；字段不是数组时视为缺失
    pub fn get_array_as_string(&self, record: &AnalysisRecord, field: &str) -> String {
        match present(record, field) {
            Some(value @ Value::Array(_)) => self.text_or_no_info(value),
            _ => NO_INFO.to_string(),
        }
    }

    /// 按列定义读取：规范名优先，其后按顺序尝试旧字段别名
    pub fn get_column(&self, record: &AnalysisRecord, column: &ColumnSpec) -> String {
        match column.lookup_order().find_map(|name| present(record, name)) {
            Some(value) => self.text_or_no_info(value),
            None => NO_INFO.to_string(),
        }
    }

    fn text_or_no_info(&self, value: &Value) -> String {
        let text = self.to_text(value);
        if text.is_empty() {
            NO_INFO.to_string()
        } else {
            text
        }
    }

    fn to_text(&self, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| self.to_text(item))
                .collect::<Vec<_>>()
                .join(self.separator),
            Value::Bool(_) | Value::Number(_) | Value::Object(_) => value.to_string(),
        }
    }
}

/// 字段存在且不为 null
fn present<'a>(record: &'a AnalysisRecord, field: &str) -> Option<&'a Value> {
    record.field(field).filter(|v| !v.is_null())
}
