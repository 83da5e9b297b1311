use std::sync::atomic::{AtomicUsize, Ordering};

/// 批处理统计（所有 worker 共享）
///
/// 三个计数器相互独立，只增不减。
#[derive(Debug, Default)]
pub struct BatchStats {
    success: AtomicUsize,
    failure: AtomicUsize,
    retry: AtomicUsize,
}

/// 某一时刻的统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub success: usize,
    pub failure: usize,
    pub retry: usize,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) -> usize {
        self.success.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_failure(&self) -> usize {
        self.failure.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 每次 API 调用失败计一次（不是每个文件一次）
    pub fn record_retry(&self) -> usize {
        self.retry.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            success: self.success.load(Ordering::Relaxed),
            failure: self.failure.load(Ordering::Relaxed),
            retry: self.retry.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// 已结束的任务数
    pub fn finished(&self) -> usize {
        self.success + self.failure
    }
}
