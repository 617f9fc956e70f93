use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tracing::{debug, info};

/// 关闭信号分发
///
/// 单次触发、幂等：重复调用 `shutdown` 只发送一次信号。
/// 触发之后的订阅者会立即收到信号，提醒循环不会错过关闭。
pub struct ShutdownManager {
    tx: broadcast::Sender<()>,
    fired: AtomicBool,
}

impl ShutdownManager {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            fired: AtomicBool::new(false),
        }
    }

    /// 订阅关闭信号
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        if self.fired.load(Ordering::SeqCst) {
            // 已触发过，给晚到的订阅者一个立即可读的信号
            let (tx, rx) = broadcast::channel(1);
            let _ = tx.send(());
            return rx;
        }
        self.tx.subscribe()
    }

    /// 触发关闭，只有第一次调用会真正发送信号
    pub fn shutdown(&self) {
        if self.fired.swap(true, Ordering::SeqCst) {
            debug!("关闭信号已触发过，忽略重复调用");
            return;
        }
        info!("发送关闭信号给 {} 个订阅者", self.tx.receiver_count());
        // 可能没有订阅者，发送失败可以忽略
        let _ = self.tx.send(());
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_shutdown_signal() {
        let manager = ShutdownManager::new();
        let mut rx = manager.subscribe();
        manager.shutdown();
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn late_subscriber_is_signalled_immediately() {
        let manager = ShutdownManager::new();
        manager.shutdown();
        let mut rx = manager.subscribe();
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn repeated_shutdown_sends_only_once() {
        let manager = ShutdownManager::new();
        let mut rx = manager.subscribe();
        manager.shutdown();
        manager.shutdown();
        assert!(rx.recv().await.is_ok());
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
