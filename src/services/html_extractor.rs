//! 网页内容提取
//!
//! 纯函数，只处理 HTML 文本：词条链接、原始页面数据、正文纯文本、文件名清理。

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

static WIKI_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href^='/w/']").expect("合法的选择器"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("合法的选择器"));
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("合法的选择器"));
static WIKI_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".wiki-content").expect("合法的选择器"));
static IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src]").expect("合法的选择器"));
/// 正文中不保留的元素
static NOISE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script, style, nav, header, footer, .advertisement, .ad, .wiki-nav, .wiki-category")
        .expect("合法的选择器")
});

static ILLEGAL_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("合法的正则"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("合法的正则"));

/// 前后需要断词的块级元素
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "table", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5",
    "h6", "section", "article", "blockquote", "pre", "dl", "dt", "dd",
];

/// 正文文件头部的分隔线长度
const SEPARATOR_WIDTH: usize = 80;

/// 词条页面的原始抓取结果（写入 raw_meme_data.json）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMemePage {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// 去掉导航、脚本等噪声后的页面文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPage {
    pub page_title: String,
    pub body_text: String,
}

/// 汇总页中的词条链接（去重，保持出现顺序，排除汇总页自身）
pub fn extract_meme_links(html: &str, base_url: &str, index_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let base_url = base_url.trim_end_matches('/');
    let mut seen = HashSet::new();

    document
        .select(&WIKI_LINK)
        .filter_map(|link| link.value().attr("href"))
        .map(|href| format!("{}{}", base_url, href))
        .filter(|url| url != index_url)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// 词条页面的标题、`.wiki-content` 的 HTML 和绝对地址图片
pub fn extract_raw_page(url: &str, html: &str) -> RawMemePage {
    let document = Html::parse_document(html);

    RawMemePage {
        url: url.to_string(),
        title: page_title(&document),
        content: document.select(&WIKI_CONTENT).next().map(|c| c.html()),
        images: document
            .select(&IMAGE)
            .filter_map(|img| img.value().attr("src"))
            .filter(|src| src.starts_with("http"))
            .map(str::to_string)
            .collect(),
    }
}

/// 页面标题 + 去噪后的正文纯文本
pub fn extract_clean_page(html: &str) -> CleanPage {
    let document = Html::parse_document(html);

    let mut raw = String::new();
    if let Some(body) = document.select(&BODY).next() {
        collect_text(body, &mut raw);
    }

    CleanPage {
        page_title: page_title(&document),
        body_text: normalize_whitespace(&raw),
    }
}

fn page_title(document: &Html) -> String {
    document
        .select(&TITLE)
        .next()
        .map(|t| normalize_whitespace(&t.text().collect::<String>()))
        .unwrap_or_default()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if NOISE.matches(&child_element) {
                continue;
            }
            let is_block = BLOCK_TAGS.contains(&child_element.value().name());
            if is_block {
                out.push(' ');
            }
            collect_text(child_element, out);
            if is_block {
                out.push(' ');
            }
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 标题转为可用的文件名
///
/// `\ / : * ? " < > |` 换成 `_`，连续空白换成一个 `_`。
pub fn sanitize_file_name(title: &str) -> String {
    let replaced = ILLEGAL_FILE_CHARS.replace_all(title, "_");
    WHITESPACE.replace_all(&replaced, "_").trim().to_string()
}

/// 正文文件内容：标题、出处、抓取时间、分隔线，然后是页面标题和正文
pub fn format_clean_text(
    title: &str,
    url: &str,
    crawled_at: DateTime<Local>,
    page: &CleanPage,
) -> String {
    let mut text = format!(
        "제목: {}\n출처: {}\n크롤링 시간: {}\n{}\n\n",
        title,
        url,
        crawled_at.format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(SEPARATOR_WIDTH)
    );

    if !page.page_title.is_empty() {
        text.push_str(&format!("페이지 제목: {}\n\n", page.page_title));
    }
    if !page.body_text.is_empty() {
        text.push_str(&format!("본문 내용:\n{}\n", page.body_text));
    }
    text
}
