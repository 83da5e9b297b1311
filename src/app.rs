//! 应用入口：把配置、客户端、服务和编排层连接起来

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::clients::{LlmClient, PageFetcher, TextGenerator, WebClient};
use crate::config::Config;
use crate::infrastructure::ShutdownSignal;
use crate::models::BatchStats;
use crate::orchestrator::{BatchProcessor, BatchReport};
use crate::services::{save_raw_pages, CrawlSummary, CsvExporter, ExportSummary, MemeAnalyzer, MemeCrawler};
use crate::utils::logging::{log_startup, print_final_stats};

/// 重新生成 CSV 的命令行参数
pub const REGENERATE_CSV_ARG: &str = "regenerate-csv";
/// 抓取词条链接和原始页面的命令行参数
pub const CRAWL_LINKS_ARG: &str = "crawl-links";
/// 抓取正文文本的命令行参数
pub const CRAWL_ARG: &str = "crawl";

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 调用 API 分析全部文件并导出 CSV
    Batch,
    /// 只从已有 JSON 结果重新生成 CSV
    RegenerateCsv,
    /// 从汇总页收集词条并保存原始页面数据
    CrawlLinks,
    /// 按原始页面数据抓取正文，写入输入目录
    Crawl,
}

impl Mode {
    /// 解析命令行参数（不含程序名）
    ///
    /// 无参数为批处理模式；无法识别的参数原样返回。
    pub fn from_args<I>(args: I) -> std::result::Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mode = match args.next().as_deref() {
            None => Mode::Batch,
            Some(REGENERATE_CSV_ARG) => Mode::RegenerateCsv,
            Some(CRAWL_LINKS_ARG) => Mode::CrawlLinks,
            Some(CRAWL_ARG) => Mode::Crawl,
            Some(other) => return Err(other.to_string()),
        };
        match args.next() {
            Some(extra) => Err(extra),
            None => Ok(mode),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Batch => write!(f, "批处理"),
            Mode::RegenerateCsv => write!(f, "CSV 重新生成"),
            Mode::CrawlLinks => write!(f, "词条链接抓取"),
            Mode::Crawl => write!(f, "正文抓取"),
        }
    }
}

/// 用法说明
pub fn usage(program: &str) -> String {
    format!(
        "用法:\n  {program} {CRAWL_LINKS_ARG}      抓取词条链接，保存原始页面数据\n  {program} {CRAWL_ARG}            按原始页面数据抓取正文文本\n  {program}                  分析输入目录下的全部文件并生成 CSV\n  {program} {REGENERATE_CSV_ARG}   从已有 JSON 结果重新生成 CSV"
    )
}

/// 应用主结构
pub struct App {
    config: Config,
    generator: Option<Arc<dyn TextGenerator>>,
    fetcher: Option<Arc<dyn PageFetcher>>,
    shutdown: ShutdownSignal,
}

/// 一次运行的结果
#[derive(Debug, Clone, Copy)]
pub enum RunOutcome {
    Batch {
        report: BatchReport,
        export: ExportSummary,
    },
    Regenerated(ExportSummary),
    /// 找到的链接数和成功保存的页面数
    LinksCollected { links: usize, pages: usize },
    Crawled(CrawlSummary),
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            generator: None,
            fetcher: None,
            shutdown: ShutdownSignal::new(),
        }
    }

    /// 使用指定的文本生成器（不再从配置创建 LlmClient）
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// 使用指定的页面获取器（不再从配置创建 WebClient）
    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// 按模式运行
    pub async fn run(&self, mode: Mode) -> Result<RunOutcome> {
        info!("▶️ 运行模式: {}", mode);
        match mode {
            Mode::Batch => self.run_batch().await,
            Mode::RegenerateCsv => Ok(RunOutcome::Regenerated(self.regenerate_csv().await?)),
            Mode::CrawlLinks => self.crawl_links().await,
            Mode::Crawl => Ok(RunOutcome::Crawled(self.crawl_texts().await?)),
        }
    }

    /// 分析全部文件，结束后导出 CSV
    pub async fn run_batch(&self) -> Result<RunOutcome> {
        let config = &self.config;
        log_startup(config.worker_pool_size, &config.llm_model_name);

        let generator: Arc<dyn TextGenerator> = match &self.generator {
            Some(generator) => generator.clone(),
            None => Arc::new(LlmClient::new(config)?),
        };

        self.shutdown.listen_for_ctrl_c();

        let stats = Arc::new(BatchStats::new());
        let analyzer =
            MemeAnalyzer::new(config, generator, stats).with_shutdown(self.shutdown.clone());
        let processor = BatchProcessor::new(config, Arc::new(analyzer));

        let report = processor.run(&config.input_dir).await?;
        print_final_stats(&report.stats, report.total, &config.output_log_file);

        let export = CsvExporter::new(config.csv_schema)
            .export_from_queue(processor.queue(), &config.csv_output_file)
            .await?;

        Ok(RunOutcome::Batch { report, export })
    }

    /// 汇总页 → 词条页面 → raw 文件
    pub async fn crawl_links(&self) -> Result<RunOutcome> {
        let config = &self.config;
        let crawler = self.crawler(config.crawl_index_rate_limit())?;

        let links = crawler
            .collect_links(&config.crawl_index_url, &config.crawl_base_url)
            .await?;
        let pages = crawler.collect_raw_pages(&links).await;
        save_raw_pages(&pages, &config.raw_data_file).await?;

        info!("✅ 词条抓取完成: {}/{} 个页面", pages.len(), links.len());
        Ok(RunOutcome::LinksCollected {
            links: links.len(),
            pages: pages.len(),
        })
    }

    /// raw 文件 → 输入目录下的正文文本
    pub async fn crawl_texts(&self) -> Result<CrawlSummary> {
        let config = &self.config;
        let crawler = self.crawler(config.crawl_rate_limit())?;
        let summary = crawler
            .crawl_clean_texts(&config.raw_data_file, &config.input_dir)
            .await?;
        Ok(summary)
    }

    fn crawler(&self, interval: Duration) -> Result<MemeCrawler> {
        let fetcher: Arc<dyn PageFetcher> = match &self.fetcher {
            Some(fetcher) => fetcher.clone(),
            None => Arc::new(WebClient::new(&self.config)?),
        };
        self.shutdown.listen_for_ctrl_c();
        Ok(MemeCrawler::new(fetcher, interval).with_shutdown(self.shutdown.clone()))
    }

    /// 不调用 API，从结果目录重新生成 CSV
    pub async fn regenerate_csv(&self) -> Result<ExportSummary> {
        let config = &self.config;
        let summary = CsvExporter::new(config.csv_schema)
            .regenerate_from_artifact_directory(&config.output_dir, &config.regenerated_csv_file)
            .await?;
        Ok(summary)
    }
}
