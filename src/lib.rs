//! # Meme Analyzer
//!
//! 抓取韩语网络梗词条正文，批量分析后输出单个 JSON 结果文件和汇总 CSV
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `clients/` - `TextGenerator` trait 与基于 async-openai 的 `LlmClient`；
//!   `PageFetcher` trait 与基于 reqwest 的 `WebClient`
//! - `infrastructure/` - 跨 worker 共享的 `RateLimiter`、`ShutdownSignal`
//!
//! ### ② 数据层（Models）
//! - `AnalysisTask` / `AnalysisRecord` - 输入文本与分析结果
//! - `CsvSchema` - 导出列、旧字段别名、数组分隔符
//! - `BatchStats` / `ResultQueue` - 并发共享的计数器与结果队列
//!
//! ### ③ 业务能力层（Services）
//! - `MemeCrawler` - 词条链接、原始页面数据、去噪正文文本
//! - `MemeAnalyzer` - 带重试、线性退避和兜底记录的分析
//! - `extract_json` - 清洗模型输出
//! - `RecordExtractor` - 兼容新旧字段的读取
//! - `ArtifactStore` - 单个 JSON 结果文件
//! - `CsvExporter` - 从队列或结果目录导出 CSV
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 扫描、并发控制、统计
//! - `orchestrator/task_processor` - 单个文件的完整流程
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use app::{App, Mode, RunOutcome};
pub use clients::{GenerationRequest, LlmClient, PageFetcher, TextGenerator, WebClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AnalysisRecord, AnalysisTask, BatchStats, CsvSchema, ResultQueue, StatsSnapshot};
pub use orchestrator::{BatchProcessor, BatchReport};
pub use services::{
    extract_json, ArtifactStore, CrawlSummary, CsvExporter, ExportSummary, MemeAnalyzer,
    MemeCrawler, RecordExtractor, NO_INFO,
};
