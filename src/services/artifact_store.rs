//! 分析结果存储服务 - 业务能力层
//!
//! 只负责"写/列出单个 JSON 结果文件"，不关心流程

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 分析结果存储
///
/// 每个源文件对应一个同名 `.json` 文件。设置了输入根目录时，
/// 子目录结构原样保留在输出目录下，不同子目录中的同名文件互不覆盖。
/// 不同 worker 写不同文件，目录创建可重复执行。
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
    input_root: Option<PathBuf>,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            input_root: None,
        }
    }

    /// 按相对于 `input_root` 的路径放置结果文件
    pub fn with_input_root(mut self, input_root: impl Into<PathBuf>) -> Self {
        self.input_root = Some(input_root.into());
        self
    }

    /// 源文件对应的结果路径（扩展名换成 `.json`）
    pub fn artifact_path(&self, source_path: &Path) -> PathBuf {
        let mut file_name = source_path.file_stem().unwrap_or_default().to_os_string();
        file_name.push(".json");

        let sub_dir = self
            .input_root
            .as_deref()
            .and_then(|root| source_path.strip_prefix(root).ok())
            .and_then(Path::parent)
            .unwrap_or(Path::new(""));
        self.output_dir.join(sub_dir).join(file_name)
    }

    /// 写入分析结果，返回写入路径
    pub async fn save(&self, source_path: &Path, json: &str) -> AppResult<PathBuf> {
        let path = self.artifact_path(source_path);
        let parent = path.parent().unwrap_or(&self.output_dir);
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;

        debug!("写入分析结果: {} ({} 字节)", path.display(), json.len());

        fs::write(&path, json)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        Ok(path)
    }

    /// 递归列出目录下所有 `.json` 文件（按路径排序）
    pub async fn list_artifacts(&self) -> AppResult<Vec<PathBuf>> {
        let dir = self.output_dir.to_string_lossy();
        crate::models::scan_input_files(&dir, "json").await
    }
}
