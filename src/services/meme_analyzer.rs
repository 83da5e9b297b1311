//! 梗分析服务 - 业务能力层
//!
//! 只负责"把一段梗文本变成分析结果文本"，不关心文件和流程。
//!
//! - 最多尝试 `max_attempts` 次，第 n 次失败后等待 `base_delay * n`
//! - 每次失败都计入共享的重试计数
//! - 全部失败或等待期间收到中断时，返回由输入文本推导出的兜底记录
//! - 永远不向调用方返回错误

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{error, info, warn};

use crate::clients::{GenerationRequest, TextGenerator};
use crate::config::Config;
use crate::error::LlmError;
use crate::infrastructure::{RateLimiter, ShutdownSignal};
use crate::models::{BatchStats, CsvSchema};
use crate::services::prompts::{build_prompt, SYSTEM_INSTRUCTION};
use crate::services::record_extractor::NO_INFO;

/// 无法从正文推导标题时使用的名称
pub const UNKNOWN_MEME_TITLE: &str = "알 수 없는 밈";

/// 兜底记录中的失败说明
pub const ANALYSIS_FAILED_NOTE: &str = "API 호출 실패로 인해 자동 분석을 수행할 수 없었습니다.";

/// 兜底记录的标签
const FALLBACK_TAGS: [&str; 2] = ["분석실패", "오류"];

/// 标题最多保留的字符数
const MAX_TITLE_CHARS: usize = 99;

/// 重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 最多尝试次数（含第一次）
    pub max_attempts: usize,
    /// 线性退避的基础等待时间
    pub base_delay: Duration,
    /// 单次调用超时
    pub call_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_api_retries.max(1),
            base_delay: config.api_retry_delay(),
            call_timeout: config.request_timeout(),
        }
    }

    /// 第 `attempt` 次失败后的等待时间
    pub fn delay_after(&self, attempt: usize) -> Duration {
        self.base_delay.saturating_mul(attempt as u32)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(2000),
            call_timeout: Duration::from_secs(60),
        }
    }
}

/// 梗分析服务
pub struct MemeAnalyzer {
    generator: Arc<dyn TextGenerator>,
    stats: Arc<BatchStats>,
    policy: RetryPolicy,
    schema: CsvSchema,
    model_name: String,
    temperature: f32,
    rate_limiter: RateLimiter,
    shutdown: ShutdownSignal,
}

impl MemeAnalyzer {
    /// 创建新的梗分析服务
    pub fn new(config: &Config, generator: Arc<dyn TextGenerator>, stats: Arc<BatchStats>) -> Self {
        Self {
            generator,
            stats,
            policy: RetryPolicy::from_config(config),
            schema: config.csv_schema,
            model_name: config.llm_model_name.clone(),
            temperature: config.temperature,
            rate_limiter: RateLimiter::new(config.rate_limit()),
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    pub fn stats(&self) -> &Arc<BatchStats> {
        &self.stats
    }

    /// 分析一段梗文本
    ///
    /// 返回模型输出（已 trim），或兜底记录的 JSON 文本。
    pub async fn analyze(&self, meme_content: &str) -> String {
        let prompt = build_prompt(self.schema, meme_content);
        let request = GenerationRequest {
            system_instruction: SYSTEM_INSTRUCTION,
            prompt: &prompt,
            model: &self.model_name,
            temperature: self.temperature,
        };
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                info!("🔄 API 调用重试 {}/{}", attempt, max_attempts);
            }

            self.rate_limiter.acquire().await;

            let failure = match tokio::time::timeout(
                self.policy.call_timeout,
                self.generator.generate(&request),
            )
            .await
            {
                Ok(Ok(response)) => return response.trim().to_string(),
                Ok(Err(e)) => e,
                Err(_) => LlmError::Timeout {
                    model: self.model_name.clone(),
                    timeout_secs: self.policy.call_timeout.as_secs(),
                }
                .into(),
            };

            self.stats.record_retry();
            warn!(
                "🔄 API 调用失败 (尝试 {}/{}): {}",
                attempt, max_attempts, failure
            );

            if attempt == max_attempts {
                break;
            }

            let delay = self.policy.delay_after(attempt);
            info!("⏳ 等待 {:.1} 秒后重试...", delay.as_secs_f64());

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.triggered() => {
                    warn!("⚠️ 重试等待被中断，返回兜底结果");
                    return fallback_record(self.schema, meme_content);
                }
            }
        }

        error!("❌ 所有重试均失败，返回兜底结果");
        fallback_record(self.schema, meme_content)
    }
}

/// 从正文推导标题：第一行非空内容，超长时截断
pub fn derive_title(meme_content: &str) -> String {
    meme_content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(MAX_TITLE_CHARS).collect())
        .unwrap_or_else(|| UNKNOWN_MEME_TITLE.to_string())
}

/// 兜底记录（只依赖输入文本，不调用外部接口）
pub fn fallback_record(schema: CsvSchema, meme_content: &str) -> String {
    let title = derive_title(meme_content);

    let record = match schema {
        CsvSchema::Rich => json!({
            "name": title,
            "meaning": ANALYSIS_FAILED_NOTE,
            "usageExamples": [],
            "origin": NO_INFO,
            "relatedMemes": [],
            "tags": FALLBACK_TAGS,
        }),
        CsvSchema::Flat => json!({
            "title": title,
            "origin": NO_INFO,
            "usageContext": ANALYSIS_FAILED_NOTE,
            "trendPeriod": NO_INFO,
            "imgUrl": null,
            "hashtags": FALLBACK_TAGS,
        }),
    };

    serde_json::to_string_pretty(&record).unwrap_or_else(|_| record.to_string())
}
