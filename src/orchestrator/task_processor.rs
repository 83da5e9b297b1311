//! 单个文件处理器 - 编排层
//!
//! 一个文件的完整流程：读取 → 分析 → 清洗 → 保存结果文件 → 入队。
//! 任一步出错都向上返回，由 batch_processor 计入失败。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::models::{load_task, ResultQueue};
use crate::services::{extract_json, ArtifactStore, MemeAnalyzer};

/// 处理单个文件，返回结果文件路径
///
/// 先写结果文件再入队：写入失败时队列中不会留下该文件的条目。
pub async fn process_file(
    analyzer: &MemeAnalyzer,
    store: &ArtifactStore,
    queue: &ResultQueue,
    source_path: &Path,
    task_index: usize,
    total: usize,
) -> Result<PathBuf> {
    let task = load_task(source_path).await?;
    info!("[{}/{}] 📄 开始分析: {}", task_index, total, task.file_name());

    let raw = analyzer.analyze(&task.raw_text).await;
    let json = extract_json(Some(&raw));
    debug!(
        "[{}/{}] 清洗后结果 {} 字节",
        task_index,
        total,
        json.len()
    );

    let artifact_path = store
        .save(&task.source_path, &json)
        .await
        .with_context(|| format!("保存分析结果失败: {}", task.file_name()))?;
    queue.push(json);

    info!(
        "[{}/{}] ✅ 完成: {} → {}",
        task_index,
        total,
        task.file_name(),
        artifact_path.display()
    );
    Ok(artifact_path)
}
