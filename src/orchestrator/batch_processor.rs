//! 批量文件处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **扫描输入**：递归列出输入目录下的文本文件，文件总数只计算一次
//! 2. **并发控制**：使用 Semaphore 限制同时运行的 worker 数量
//! 3. **结构化并发**：所有任务放入 JoinSet，全部结束后才返回
//! 4. **全局统计**：成功 / 失败 / 重试三个计数器
//!
//! 单个任务失败只计入失败数，不影响其他任务。
//! 收到中断信号后，尚未开始的任务直接计为失败，不再调用 API。

use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{scan_input_files, BatchStats, ResultQueue, StatsSnapshot};
use crate::orchestrator::task_processor;
use crate::services::{ArtifactStore, MemeAnalyzer};
use crate::utils::logging::log_tasks_found;

/// 一次批处理的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// 找到的文件总数
    pub total: usize,
    /// 结束时的计数器
    pub stats: StatsSnapshot,
}

/// 批量处理器
pub struct BatchProcessor {
    analyzer: Arc<MemeAnalyzer>,
    store: ArtifactStore,
    queue: Arc<ResultQueue>,
    pool_size: usize,
    input_extension: String,
}

impl BatchProcessor {
    pub fn new(config: &Config, analyzer: Arc<MemeAnalyzer>) -> Self {
        Self {
            analyzer,
            store: ArtifactStore::new(&config.output_dir),
            queue: Arc::new(ResultQueue::new()),
            pool_size: config.worker_pool_size.max(1),
            input_extension: config.input_extension.clone(),
        }
    }

    /// 结果队列（批处理结束后交给 CSV 导出）
    pub fn queue(&self) -> &Arc<ResultQueue> {
        &self.queue
    }

    pub fn stats(&self) -> &Arc<BatchStats> {
        self.analyzer.stats()
    }

    /// 处理输入目录下的所有文件
    ///
    /// 输入目录不存在时返回错误，不启动任何任务。
    pub async fn run(&self, input_dir: &str) -> AppResult<BatchReport> {
        info!("\n📁 正在扫描待处理的文件...");
        let files = scan_input_files(input_dir, &self.input_extension).await?;
        let total = files.len();

        if total == 0 {
            warn!("⚠️ 没有找到 .{} 文件", self.input_extension);
            return Ok(BatchReport {
                total,
                stats: self.stats().snapshot(),
            });
        }

        log_tasks_found(total, input_dir);

        let store = self.store.clone().with_input_root(input_dir);
        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let mut tasks = JoinSet::new();

        for (idx, path) in files.into_iter().enumerate() {
            let task_index = idx + 1;
            let semaphore = semaphore.clone();
            let analyzer = self.analyzer.clone();
            let store = store.clone();
            let queue = self.queue.clone();

            tasks.spawn(async move {
                // 信号量不会被关闭
                let _permit = semaphore.acquire_owned().await;
                if analyzer.shutdown_signal().is_triggered() {
                    return (task_index, path, Err(anyhow!("收到中断信号，跳过")));
                }
                let result = task_processor::process_file(
                    &analyzer, &store, &queue, &path, task_index, total,
                )
                .await;
                (task_index, path, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, _, Ok(_))) => {
                    self.stats().record_success();
                }
                Ok((task_index, path, Err(e))) => {
                    self.stats().record_failure();
                    log_task_failure(task_index, total, &path, &e);
                }
                Err(e) => {
                    self.stats().record_failure();
                    error!("任务执行失败: {}", e);
                }
            }
        }

        Ok(BatchReport {
            total,
            stats: self.stats().snapshot(),
        })
    }
}

fn log_task_failure(task_index: usize, total: usize, path: &Path, e: &anyhow::Error) {
    error!(
        "[{}/{}] ❌ 处理失败: {} - {:#}",
        task_index,
        total,
        path.display(),
        e
    );
}
