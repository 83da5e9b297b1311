use crate::error::{AppError, AppResult};
use crate::models::record::AnalysisTask;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读取单个文本文件，生成分析任务
pub async fn load_task(text_file_path: &Path) -> Result<AnalysisTask> {
    let content = fs::read_to_string(text_file_path)
        .await
        .with_context(|| format!("无法读取文本文件: {}", text_file_path.display()))?;

    Ok(AnalysisTask::new(text_file_path, content))
}

/// 递归扫描文件夹，返回所有扩展名匹配的普通文件（按路径排序）
pub async fn scan_input_files(folder_path: &str, extension: &str) -> AppResult<Vec<PathBuf>> {
    let folder = PathBuf::from(folder_path);

    if !fs::try_exists(&folder).await.unwrap_or(false) {
        return Err(AppError::directory_not_found(folder_path));
    }

    let mut files = Vec::new();
    let mut pending = vec![folder];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?
        {
            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!("无法读取文件类型 {}: {}", path.display(), e);
                    continue;
                }
            };

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && has_extension(&path, extension) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(extension)
}
