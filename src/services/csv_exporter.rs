//! CSV 导出服务 - 业务能力层
//!
//! 把分析结果（内存队列或磁盘上的 JSON 文件）按固定列输出为一个 CSV 文件。
//! 每列先读规范字段名，再按顺序回退到旧字段别名，都没有时写 `정보 없음`。

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use tokio::fs;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{AnalysisRecord, CsvSchema, ResultQueue};
use crate::services::artifact_store::ArtifactStore;
use crate::services::record_extractor::{RecordExtractor, NO_INFO};
use crate::utils::logging::truncate_text;

/// 重新生成时同时读取的文件数
const READ_CONCURRENCY: usize = 16;

/// 导出统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// 写入的数据行数
    pub rows: usize,
    /// 解析失败被跳过的条目数
    pub skipped: usize,
}

/// CSV 字段转义
///
/// 空值替换为 `정보 없음`；包含逗号、双引号或换行时整体加双引号，内部双引号加倍。
pub fn escape_csv(value: &str) -> String {
    if value.is_empty() {
        return NO_INFO.to_string();
    }

    if value.contains(['"', ',', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV 导出服务
#[derive(Debug, Clone, Copy)]
pub struct CsvExporter {
    schema: CsvSchema,
    extractor: RecordExtractor,
}

impl CsvExporter {
    pub fn new(schema: CsvSchema) -> Self {
        Self {
            schema,
            extractor: RecordExtractor::for_schema(schema),
        }
    }

    /// 一条记录对应的一行（不含换行符）
    pub fn render_row(&self, record: &AnalysisRecord) -> String {
        self.schema
            .columns()
            .iter()
            .map(|column| escape_csv(&self.extractor.get_column(record, column)))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// 把若干 JSON 文本渲染为完整 CSV 内容
    ///
    /// 解析失败的条目记录警告后跳过。
    pub fn render<'a, I>(&self, entries: I) -> (String, ExportSummary)
    where
        I: IntoIterator<Item = (String, &'a str)>,
    {
        let mut content = self.schema.header();
        content.push('\n');
        let mut summary = ExportSummary::default();

        for (label, json) in entries {
            match AnalysisRecord::parse(json) {
                Ok(record) => {
                    content.push_str(&self.render_row(&record));
                    content.push('\n');
                    summary.rows += 1;
                }
                Err(e) => {
                    summary.skipped += 1;
                    warn!("JSON 解析错误 ({}): {}", label, e);
                    warn!("JSON 内容: {}", truncate_text(json, 200));
                }
            }
        }

        (content, summary)
    }

    /// 取出结果队列中的全部条目并写入 CSV（覆盖已有文件）
    pub async fn export_from_queue(
        &self,
        queue: &ResultQueue,
        csv_path: impl AsRef<Path>,
    ) -> AppResult<ExportSummary> {
        let entries = queue.drain();
        let (content, summary) = self.render(
            entries
                .iter()
                .enumerate()
                .map(|(i, json)| (format!("队列条目 #{}", i + 1), json.as_str())),
        );

        write_csv(csv_path.as_ref(), &content).await?;

        info!("CSV 文件生成完成: {}", csv_path.as_ref().display());
        info!(
            "共 {} 条梗数据写入 CSV（跳过 {} 条）",
            summary.rows, summary.skipped
        );
        Ok(summary)
    }

    /// 不调用 API，直接从已有 JSON 结果目录重新生成 CSV
    pub async fn regenerate_from_artifact_directory(
        &self,
        artifact_dir: impl AsRef<Path>,
        csv_path: impl AsRef<Path>,
    ) -> AppResult<ExportSummary> {
        info!("=== CSV 重新生成开始 ===");

        let store = ArtifactStore::new(artifact_dir.as_ref());
        let files = store.list_artifacts().await?;

        let loaded: Vec<(PathBuf, Option<String>)> = stream::iter(files)
            .map(|path| async move {
                match fs::read_to_string(&path).await {
                    Ok(content) => (path, Some(content)),
                    Err(e) => {
                        warn!("❌ 读取失败: {} - {}", path.display(), e);
                        (path, None)
                    }
                }
            })
            .buffered(READ_CONCURRENCY)
            .collect()
            .await;

        let unreadable = loaded.iter().filter(|(_, c)| c.is_none()).count();
        let (content, mut summary) = self.render(loaded.iter().filter_map(|(path, content)| {
            content.as_deref().map(|json| (display_name(path), json))
        }));
        summary.skipped += unreadable;

        write_csv(csv_path.as_ref(), &content).await?;

        info!("=== CSV 重新生成完成 ===");
        info!("✅ 成功: {} 个", summary.rows);
        info!("❌ 失败: {} 个", summary.skipped);
        info!("📄 输出文件: {}", csv_path.as_ref().display());
        Ok(summary)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

async fn write_csv(path: &Path, content: &str) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
    }
    fs::write(path, content)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))
}
