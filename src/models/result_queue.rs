use std::sync::{Mutex, PoisonError};

/// 结果队列
///
/// 所有 worker 并发写入清洗后的 JSON 文本，批处理结束后一次性取出交给 CSV 导出。
/// 顺序没有意义。
#[derive(Debug, Default)]
pub struct ResultQueue {
    entries: Mutex<Vec<String>>,
}

impl ResultQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, json: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(json);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 取出全部结果，队列随之清空
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
