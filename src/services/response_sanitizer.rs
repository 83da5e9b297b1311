//! LLM 响应清洗
//!
//! 去掉 markdown 代码块标记，截取第一个 `{` 到最后一个 `}` 之间的内容。
//! 不校验 JSON 语法，只定位边界。

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::utils::logging::truncate_text;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```(?:[jJ][sS][oO][nN])?\s*").expect("合法的正则"));
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```\s*$").expect("合法的正则"));

/// 从 LLM 响应中提取 JSON 对象文本
///
/// - `None` → `"{}"`
/// - 找到 `{...}` → 返回包含两端花括号的子串
/// - 否则返回清洗后的全文（调用方需自行处理解析失败）
pub fn extract_json(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "{}".to_string();
    };

    let cleaned = strip_fences(raw);

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end > start => {
            let extracted = &cleaned[start..=end];
            debug!("提取到 JSON: {}", truncate_text(extracted, 100));
            extracted.to_string()
        }
        _ => {
            warn!("JSON 提取失败，使用原始响应: {}", truncate_text(&cleaned, 200));
            cleaned
        }
    }
}

/// 去掉首尾的 markdown 代码块标记
pub fn strip_fences(raw: &str) -> String {
    let without_open = OPENING_FENCE.replace(raw, "");
    let without_close = CLOSING_FENCE.replace(&without_open, "");
    without_close.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{"name": "무야호", "tags": ["무한도전", "환호"]}"#;

    #[test]
    fn test_none_gives_empty_object() {
        assert_eq!(extract_json(None), "{}");
    }

    #[test]
    fn test_fenced_json() {
        let raw = format!("```json\n{}\n```", RECORD);
        assert_eq!(extract_json(Some(&raw)), RECORD);

        let raw = format!("```\n{}\n```\n", RECORD);
        assert_eq!(extract_json(Some(&raw)), RECORD);
    }

    #[test]
    fn test_surrounding_prose() {
        let raw = format!("분석 결과입니다:\n```json\n{}\n```\n참고하세요.", RECORD);
        assert_eq!(extract_json(Some(&raw)), RECORD);

        let raw = format!("Sure! {} Hope this helps.", RECORD);
        assert_eq!(extract_json(Some(&raw)), RECORD);
    }

    #[test]
    fn test_nested_object_keeps_outer_braces() {
        let raw = r#"{"a": {"b": 1}}"#;
        assert_eq!(extract_json(Some(raw)), raw);
    }

    #[test]
    fn test_no_object_returns_cleaned_text() {
        assert_eq!(extract_json(Some("```json\n분석 불가\n```")), "분석 불가");
        assert_eq!(extract_json(Some("  } reversed {  ")), "} reversed {");
        assert_eq!(extract_json(Some("")), "");
    }

    #[test]
    fn test_clean_text_is_fixed_point() {
        for text in ["분석 불가", "only { open", "only } close", RECORD] {
            let once = extract_json(Some(text));
            assert_eq!(extract_json(Some(&once)), once);
        }
    }
}
