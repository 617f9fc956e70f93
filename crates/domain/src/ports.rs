//! 通知通道抽象
//!
//! 通道集合是封闭的（邮件、Telegram机器人），按接收人解析一次，
//! 不做基于字符串比较的鸭子类型分发。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use petcare_errors::PetcareResult;

use crate::entities::{ReminderChannel, User};
use crate::messaging::TaskCallbackMessage;

/// 待发送的通知内容
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
}

/// 消息上的交互按钮，仅机器人通道支持
#[derive(Debug, Clone)]
pub struct InteractiveAction {
    pub label: String,
    pub callback: TaskCallbackMessage,
}

/// 发送回执，确认提交到通道后才返回
#[derive(Debug, Clone, Copy)]
pub struct DeliveryReceipt {
    pub channel: ReminderChannel,
    pub delivered_at: DateTime<Utc>,
}

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn kind(&self) -> ReminderChannel;

    /// 发送通知。只有通道确认接收才返回 Ok，失败必须返回错误，
    /// 以便调度器释放提醒认领并在下一轮重试。
    async fn send(
        &self,
        recipient: &User,
        message: &NotificationMessage,
        actions: Option<&[InteractiveAction]>,
    ) -> PetcareResult<DeliveryReceipt>;
}
