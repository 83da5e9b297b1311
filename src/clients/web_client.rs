/// 网页抓取客户端
///
/// 固定 User-Agent 和超时，只返回页面 HTML 文本。
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;

/// 页面获取能力
///
/// 抓取流程只依赖这个 trait，测试中用固定页面替换真实网络。
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// 基于 reqwest 的页面客户端
pub struct WebClient {
    client: reqwest::Client,
}

impl WebClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.crawl_user_agent)
            .timeout(config.crawl_timeout())
            .build()
            .context("无法创建 HTTP 客户端")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for WebClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("请求页面: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("请求失败: {}", url))?
            .error_for_status()
            .with_context(|| format!("服务器返回错误状态: {}", url))?;

        response
            .text()
            .await
            .with_context(|| format!("读取页面内容失败: {}", url))
    }
}
