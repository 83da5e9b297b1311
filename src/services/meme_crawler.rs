//! 梗词条抓取服务 - 业务能力层
//!
//! 两个阶段：
//!
//! 1. 汇总页 → 词条链接 → 每个词条的原始页面数据（raw_meme_data.json）
//! 2. raw_meme_data.json → 每个词条一个去噪后的正文文本文件（分析阶段的输入）
//!
//! 请求逐个发出，相邻请求之间由限速器保证最小间隔。
//! 单个页面失败只记录日志，不中断整个阶段；收到中断信号后停止发出新请求。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use serde_json::Value;
use tokio::fs;
use tracing::{error, info, warn};

use crate::clients::PageFetcher;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{RateLimiter, ShutdownSignal};
use crate::services::html_extractor::{
    extract_clean_page, extract_meme_links, extract_raw_page, format_clean_text,
    sanitize_file_name, RawMemePage,
};
use crate::utils::logging::truncate_text;

/// 正文抓取阶段的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// raw 文件中的条目数
    pub total: usize,
    /// 写入的文本文件数
    pub saved: usize,
    /// 缺少 url 或 title 被跳过的条目数
    pub skipped: usize,
    /// 请求或写入失败的条目数
    pub failed: usize,
}

/// 梗词条抓取服务
pub struct MemeCrawler {
    fetcher: Arc<dyn PageFetcher>,
    rate_limiter: RateLimiter,
    shutdown: ShutdownSignal,
}

impl MemeCrawler {
    /// `interval` 为相邻两次请求的最小间隔
    pub fn new(fetcher: Arc<dyn PageFetcher>, interval: Duration) -> Self {
        Self {
            fetcher,
            rate_limiter: RateLimiter::new(interval),
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        self.rate_limiter.acquire().await;
        self.fetcher.fetch(url).await
    }

    /// 从汇总页收集词条链接
    pub async fn collect_links(&self, index_url: &str, base_url: &str) -> Result<Vec<String>> {
        info!("🌐 抓取汇总页: {}", index_url);
        let html = self
            .fetch(index_url)
            .await
            .context("汇总页抓取失败")?;

        let links = extract_meme_links(&html, base_url, index_url);
        info!("🔗 找到 {} 个词条链接", links.len());
        Ok(links)
    }

    /// 逐个抓取词条页面，失败的页面跳过
    pub async fn collect_raw_pages(&self, links: &[String]) -> Vec<RawMemePage> {
        let total = links.len();
        let mut pages = Vec::with_capacity(total);

        for (idx, url) in links.iter().enumerate() {
            if self.shutdown.is_triggered() {
                warn!("⚠️ 收到中断信号，停止抓取（剩余 {} 个）", total - idx);
                break;
            }

            info!("[{}/{}] 🌐 抓取: {}", idx + 1, total, url);
            match self.fetch(url).await {
                Ok(html) => pages.push(extract_raw_page(url, &html)),
                Err(e) => error!("[{}/{}] ❌ 抓取失败: {} - {:#}", idx + 1, total, url, e),
            }
        }

        pages
    }

    /// 读取 raw 文件，为每个词条写入 `<output_dir>/<清理后的标题>.txt`
    ///
    /// raw 文件不存在或不是 JSON 数组时返回错误；同名标题后写入的覆盖先写入的。
    pub async fn crawl_clean_texts(
        &self,
        raw_data_file: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> AppResult<CrawlSummary> {
        let raw_data_file = raw_data_file.as_ref();
        let output_dir = output_dir.as_ref();

        info!("=== 正文抓取开始: {} ===", raw_data_file.display());
        let entries = load_raw_entries(raw_data_file).await?;
        let total = entries.len();
        info!("📄 共 {} 个词条待抓取", total);

        fs::create_dir_all(output_dir)
            .await
            .map_err(|e| AppError::file_write_failed(output_dir.display().to_string(), e))?;

        let mut summary = CrawlSummary {
            total,
            ..CrawlSummary::default()
        };

        for (idx, entry) in entries.iter().enumerate() {
            if self.shutdown.is_triggered() {
                warn!("⚠️ 收到中断信号，停止抓取（剩余 {} 个）", total - idx);
                break;
            }

            let url = entry.get("url").and_then(Value::as_str);
            let title = entry.get("title").and_then(Value::as_str);
            let (Some(url), Some(title)) = (url, title) else {
                summary.skipped += 1;
                warn!(
                    "跳过缺少 url 或 title 的条目: {}",
                    truncate_text(&entry.to_string(), 200)
                );
                continue;
            };

            info!("[{}/{}] 🌐 抓取正文: {}", idx + 1, total, title);
            match self.crawl_clean_text(url, title, output_dir).await {
                Ok(path) => {
                    summary.saved += 1;
                    info!("[{}/{}] ✅ 已保存: {}", idx + 1, total, path.display());
                }
                Err(e) => {
                    summary.failed += 1;
                    error!("[{}/{}] ❌ 处理失败: {} ({}) - {:#}", idx + 1, total, title, url, e);
                }
            }
        }

        info!("=== 正文抓取完成 ===");
        info!("✅ 保存: {} 个", summary.saved);
        info!("⏭️ 跳过: {} 个", summary.skipped);
        info!("❌ 失败: {} 个", summary.failed);
        Ok(summary)
    }

    async fn crawl_clean_text(&self, url: &str, title: &str, output_dir: &Path) -> Result<PathBuf> {
        let html = self.fetch(url).await?;
        let page = extract_clean_page(&html);
        let text = format_clean_text(title, url, Local::now(), &page);

        let path = output_dir.join(format!("{}.txt", sanitize_file_name(title)));
        fs::write(&path, text)
            .await
            .with_context(|| format!("写入文本文件失败: {}", path.display()))?;
        Ok(path)
    }
}

/// 把原始页面数据写成格式化的 JSON 数组
pub async fn save_raw_pages(pages: &[RawMemePage], path: impl AsRef<Path>) -> AppResult<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(pages)
        .map_err(|e| AppError::json_failed(path.display().to_string(), e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
    }
    fs::write(path, json)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    info!("💾 原始数据已保存: {} ({} 条)", path.display(), pages.len());
    Ok(())
}

/// 读取 raw 文件中的条目（每个条目是任意 JSON 值）
async fn load_raw_entries(path: &Path) -> AppResult<Vec<Value>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    serde_json::from_str(&content).map_err(|e| AppError::json_failed(path.display().to_string(), e))
}
