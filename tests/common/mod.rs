#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use meme_analyzer::{Config, GenerationRequest, PageFetcher, TextGenerator};

/// 模型返回的固定记录（带代码块和多余说明）
pub const MOCK_TITLE: &str = "무야호";
pub const MOCK_RESPONSE: &str = "분석 결과입니다.\n```json\n{\n  \"name\": \"무야호\",\n  \"meaning\": \"기쁨을 표현하는 외침, 환호\",\n  \"usageExamples\": [\"무야호~\", \"그만큼 신나시다는 거지\"],\n  \"origin\": \"무한도전 \\\"알래스카\\\" 편\",\n  \"relatedMemes\": [],\n  \"tags\": [\"무한도전\", \"환호\"]\n}\n```\n참고하세요.";

/// 按脚本返回结果的文本生成器
///
/// 全局前 `failures` 次调用失败，之后返回 `response`。
pub struct ScriptedGenerator {
    failures: usize,
    response: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn echo(response: &str) -> Self {
        Self::failing_first(0, response)
    }

    pub fn failing_first(failures: usize, response: &str) -> Self {
        Self {
            failures,
            response: Some(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always_failing() -> Self {
        Self {
            failures: usize::MAX,
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _request: &GenerationRequest<'_>) -> anyhow::Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(response) if call >= self.failures => Ok(response.clone()),
            _ => Err(anyhow!("503 Service Unavailable (call #{})", call + 1)),
        }
    }
}

/// 按 URL 返回固定页面的获取器，未登记的 URL 返回 404
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new(pages: Vec<(String, String)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("404 Not Found: {}", url))
    }
}

/// 在临时目录下布置输入文件并生成指向该目录的配置
pub fn workspace(root: &Path, files: &[(&str, &str)]) -> Config {
    let input = root.join("clean_text_data");
    std::fs::create_dir_all(&input).unwrap();
    for (name, content) in files {
        let path = input.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    Config {
        input_dir: input.display().to_string(),
        output_dir: root.join("analyzed_meme_data_json").display().to_string(),
        csv_output_file: root.join("meme_analysis_results.csv").display().to_string(),
        regenerated_csv_file: root
            .join("meme_analysis_results_regenerated.csv")
            .display()
            .to_string(),
        output_log_file: root.join("analysis_log.txt").display().to_string(),
        raw_data_file: root.join("raw_meme_data.json").display().to_string(),
        crawl_index_rate_limit_ms: 0,
        crawl_rate_limit_ms: 0,
        worker_pool_size: 4,
        max_api_retries: 3,
        api_retry_delay_ms: 1,
        ..Config::default()
    }
}

/// 读取 CSV：返回表头和数据行
pub fn read_csv(path: impl AsRef<Path>) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}
