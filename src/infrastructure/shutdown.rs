//! 中断信号
//!
//! 第一次 Ctrl-C：尚未开始的文件不再处理，重试等待中的文件直接返回兜底记录。
//! 第二次 Ctrl-C：立即退出进程（退出码 130）。

use tokio::sync::watch;

/// 强制退出时的进程退出码
pub const FORCED_EXIT_CODE: i32 = 130;

/// 可克隆的中断信号，所有 worker 共享同一个发送端
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// 触发中断
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// 等待中断；已经触发时立即返回
    pub async fn triggered(&self) {
        let mut receiver = self.sender.subscribe();
        // 发送端由 self 持有，wait_for 不会因通道关闭而返回错误
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }

    /// Ctrl-C 时触发，再次 Ctrl-C 强制退出
    pub fn listen_for_ctrl_c(&self) {
        let signal = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            tracing::warn!("⚠️ 收到中断信号，不再启动新的任务（再按一次 Ctrl-C 强制退出）");
            signal.trigger();

            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::error!("🛑 再次收到中断信号，强制退出");
                std::process::exit(FORCED_EXIT_CODE);
            }
        });
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_wakes_waiters() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_triggered());

        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.triggered().await })
        };

        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_already_triggered_returns_immediately() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        tokio::time::timeout(Duration::from_millis(100), signal.triggered())
            .await
            .unwrap();
    }
}
