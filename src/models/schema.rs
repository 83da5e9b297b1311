//! CSV 导出结构
//!
//! 同一条梗（meme）记录在历史上存在多代字段命名：每一列有一个规范字段名，
//! 旧字段别名统一登记在 `LEGACY_ALIASES` 中，按顺序回退。

use std::fmt;
use std::str::FromStr;

use phf::phf_map;
use serde::Deserialize;

/// 单列定义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
}

impl ColumnSpec {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        legacy_aliases(self.name)
    }

    /// 规范名在前，别名依次在后
    pub fn lookup_order(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.aliases().iter().copied())
    }
}

/// 字段别名表，键为规范字段名
static LEGACY_ALIASES: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "name" => &["title"],
    "title" => &["name"],
    "meaning" => &["usageContext", "description"],
    "usageContext" => &["meaning", "description"],
    "relatedMemes" => &["related_memes"],
    "tags" => &["hashtags", "keywords"],
    "hashtags" => &["tags", "keywords"],
    "trendPeriod" => &["popularity_period"],
    "imgUrl" => &["media_urls"],
};

const RICH_COLUMNS: [ColumnSpec; 6] = [
    ColumnSpec::new("name"),
    ColumnSpec::new("meaning"),
    ColumnSpec::new("usageExamples"),
    ColumnSpec::new("origin"),
    ColumnSpec::new("relatedMemes"),
    ColumnSpec::new("tags"),
];

const FLAT_COLUMNS: [ColumnSpec; 6] = [
    ColumnSpec::new("title"),
    ColumnSpec::new("origin"),
    ColumnSpec::new("usageContext"),
    ColumnSpec::new("trendPeriod"),
    ColumnSpec::new("imgUrl"),
    ColumnSpec::new("hashtags"),
];

/// 返回某个规范字段登记的旧字段别名
pub fn legacy_aliases(field: &str) -> &'static [&'static str] {
    LEGACY_ALIASES.get(field).copied().unwrap_or(&[])
}

/// CSV 导出结构（决定列、数组分隔符、提示词和兜底记录的形状）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvSchema {
    /// name,meaning,usageExamples,origin,relatedMemes,tags
    #[default]
    Rich,
    /// title,origin,usageContext,trendPeriod,imgUrl,hashtags
    Flat,
}

impl CsvSchema {
    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            CsvSchema::Rich => &RICH_COLUMNS,
            CsvSchema::Flat => &FLAT_COLUMNS,
        }
    }

    /// 数组字段拼接时使用的分隔符
    pub fn array_separator(&self) -> &'static str {
        match self {
            CsvSchema::Rich => " | ",
            CsvSchema::Flat => ", ",
        }
    }

    pub fn header(&self) -> String {
        self.columns()
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromStr for CsvSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rich" => Ok(CsvSchema::Rich),
            "flat" => Ok(CsvSchema::Flat),
            other => Err(format!("未知的 CSV 结构: {}", other)),
        }
    }
}

impl fmt::Display for CsvSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvSchema::Rich => write!(f, "rich"),
            CsvSchema::Flat => write!(f, "flat"),
        }
    }
}
