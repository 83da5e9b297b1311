pub mod artifact_store;
pub mod csv_exporter;
pub mod html_extractor;
pub mod meme_analyzer;
pub mod meme_crawler;
pub mod prompts;
pub mod record_extractor;
pub mod response_sanitizer;

pub use artifact_store::ArtifactStore;
pub use csv_exporter::{escape_csv, CsvExporter, ExportSummary};
pub use html_extractor::RawMemePage;
pub use meme_analyzer::{fallback_record, MemeAnalyzer, RetryPolicy};
pub use meme_crawler::{save_raw_pages, CrawlSummary, MemeCrawler};
pub use record_extractor::{RecordExtractor, NO_INFO};
pub use response_sanitizer::extract_json;
