use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError, FileError};
use crate::models::CsvSchema;

/// 默认配置文件名（工作目录下）
pub const DEFAULT_CONFIG_FILE: &str = "analyzer.toml";

/// 程序配置文件
///
/// 加载顺序：默认值 → TOML 配置文件 → 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 待分析的文本目录
    pub input_dir: String,
    /// 待分析文件的扩展名（不含点）
    pub input_extension: String,
    /// 单个分析结果 JSON 的输出目录
    pub output_dir: String,
    /// 批处理结束后生成的 CSV
    pub csv_output_file: String,
    /// 从已有 JSON 重新生成的 CSV
    pub regenerated_csv_file: String,
    /// 同时处理的文件数量
    pub worker_pool_size: usize,
    /// 单个文件的最大 API 尝试次数
    pub max_api_retries: usize,
    /// 重试基础等待时间（毫秒），第 n 次失败后等待 n 倍
    pub api_retry_delay_ms: u64,
    /// 单次 API 调用超时（秒）
    pub request_timeout_secs: u64,
    /// 相邻两次 API 调用的最小间隔（毫秒），0 表示不限制
    pub rate_limit_ms: u64,
    /// CSV 导出结构
    pub csv_schema: CsvSchema,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    #[serde(skip)]
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub temperature: f32,
    // --- 抓取配置 ---
    /// 梗词条汇总页
    pub crawl_index_url: String,
    /// 词条链接的站点前缀
    pub crawl_base_url: String,
    /// 原始抓取结果（url + title 列表）
    pub raw_data_file: String,
    /// 抓取词条链接时的请求间隔（毫秒）
    pub crawl_index_rate_limit_ms: u64,
    /// 抓取正文时的请求间隔（毫秒）
    pub crawl_rate_limit_ms: u64,
    /// 单个页面的请求超时（秒）
    pub crawl_timeout_secs: u64,
    pub crawl_user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: "clean_text_data".to_string(),
            input_extension: "txt".to_string(),
            output_dir: "analyzed_meme_data_json".to_string(),
            csv_output_file: "meme_analysis_results.csv".to_string(),
            regenerated_csv_file: "meme_analysis_results_regenerated.csv".to_string(),
            worker_pool_size: 10,
            max_api_retries: 3,
            api_retry_delay_ms: 2000,
            request_timeout_secs: 60,
            rate_limit_ms: 0,
            csv_schema: CsvSchema::Rich,
            verbose_logging: false,
            output_log_file: "analysis_log.txt".to_string(),
            llm_api_key: None,
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            temperature: 0.3,
            crawl_index_url: "https://namu.wiki/w/%EB%B0%88(%EC%9D%B8%ED%84%B0%EB%84%B7%20%EC%9A%A9%EC%96%B4)/%EB%8C%80%ED%95%9C%EB%AF%BC%EA%B5%AD".to_string(),
            crawl_base_url: "https://namu.wiki".to_string(),
            raw_data_file: "raw_meme_data.json".to_string(),
            crawl_index_rate_limit_ms: 2000,
            crawl_rate_limit_ms: 500,
            crawl_timeout_secs: 15,
            crawl_user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

impl Config {
    /// 加载完整配置
    ///
    /// `MEME_ANALYZER_CONFIG` 指定配置文件；未指定时若工作目录下存在
    /// `analyzer.toml` 则读取它。环境变量最后覆盖。
    pub fn load() -> AppResult<Self> {
        let explicit = std::env::var("MEME_ANALYZER_CONFIG").ok();
        let base = match explicit.as_deref() {
            Some(path) => Self::from_toml_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };

        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 只读取环境变量（基于默认值）
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺省项使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content).map_err(|source| {
            FileError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            }
            .into()
        })
    }

    /// 解析 TOML 文本
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖当前配置
    pub fn with_env_overrides(self) -> AppResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// 用任意键值来源覆盖当前配置（便于测试）
    pub fn with_overrides<F>(self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = self;
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Ok(Self {
            input_dir: lookup("INPUT_DIR").unwrap_or(d.input_dir),
            input_extension: lookup("INPUT_EXTENSION").unwrap_or(d.input_extension),
            output_dir: lookup("OUTPUT_DIR").unwrap_or(d.output_dir),
            csv_output_file: lookup("CSV_OUTPUT_FILE").unwrap_or(d.csv_output_file),
            regenerated_csv_file: lookup("REGENERATED_CSV_FILE").unwrap_or(d.regenerated_csv_file),
            worker_pool_size: parse_var(&lookup, "WORKER_POOL_SIZE", "usize")?
                .unwrap_or(d.worker_pool_size),
            max_api_retries: parse_var(&lookup, "MAX_API_RETRIES", "usize")?
                .unwrap_or(d.max_api_retries),
            api_retry_delay_ms: parse_var(&lookup, "API_RETRY_DELAY_MS", "u64")?
                .unwrap_or(d.api_retry_delay_ms),
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(d.request_timeout_secs),
            rate_limit_ms: parse_var(&lookup, "RATE_LIMIT_MS", "u64")?.unwrap_or(d.rate_limit_ms),
            csv_schema: parse_var(&lookup, "CSV_SCHEMA", "rich|flat")?.unwrap_or(d.csv_schema),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?
                .unwrap_or(d.verbose_logging),
            output_log_file: lookup("OUTPUT_LOG_FILE").unwrap_or(d.output_log_file),
            llm_api_key: non_empty("GEMINI_API_KEY")
                .or_else(|| non_empty("LLM_API_KEY"))
                .or(d.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(d.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(d.llm_model_name),
            temperature: parse_var(&lookup, "LLM_TEMPERATURE", "f32")?.unwrap_or(d.temperature),
            crawl_index_url: lookup("CRAWL_INDEX_URL").unwrap_or(d.crawl_index_url),
            crawl_base_url: lookup("CRAWL_BASE_URL").unwrap_or(d.crawl_base_url),
            raw_data_file: lookup("RAW_DATA_FILE").unwrap_or(d.raw_data_file),
            crawl_index_rate_limit_ms: parse_var(&lookup, "CRAWL_INDEX_RATE_LIMIT_MS", "u64")?
                .unwrap_or(d.crawl_index_rate_limit_ms),
            crawl_rate_limit_ms: parse_var(&lookup, "CRAWL_RATE_LIMIT_MS", "u64")?
                .unwrap_or(d.crawl_rate_limit_ms),
            crawl_timeout_secs: parse_var(&lookup, "CRAWL_TIMEOUT_SECS", "u64")?
                .unwrap_or(d.crawl_timeout_secs),
            crawl_user_agent: lookup("CRAWL_USER_AGENT").unwrap_or(d.crawl_user_agent),
        })
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "worker_pool_size".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        if self.max_api_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_api_retries".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 批处理必须有 API 密钥
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.llm_api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn api_retry_delay(&self) -> Duration {
        Duration::from_millis(self.api_retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn crawl_index_rate_limit(&self) -> Duration {
        Duration::from_millis(self.crawl_index_rate_limit_ms)
    }

    pub fn crawl_rate_limit(&self) -> Duration {
        Duration::from_millis(self.crawl_rate_limit_ms)
    }

    pub fn crawl_timeout(&self) -> Duration {
        Duration::from_secs(self.crawl_timeout_secs)
    }
}

fn parse_var<T, F>(lookup: &F, var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
