//! 通知分发
//!
//! 按接收人解析一次通道（偏好Telegram且已绑定chat则走机器人，
//! 否则有邮箱走邮件），组装消息并发送。到期时间按接收人偏好的
//! 时区偏移显式格式化，不依赖任何全局时区上下文。

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use petcare_domain::entities::{CommunicationMethod, Pet, ReminderChannel, Task, User};
use petcare_domain::messaging::{CallbackAction, TaskCallbackMessage};
use petcare_domain::ports::{
    DeliveryReceipt, InteractiveAction, NotificationChannel, NotificationMessage,
};
use petcare_errors::{PetcareError, PetcareResult};

/// 到期时间的展示格式化，时区偏移由调用方显式传入
pub fn format_due_datetime(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant
        .with_timezone(&offset)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

pub struct NotificationDispatcher {
    email_channel: Arc<dyn NotificationChannel>,
    telegram_channel: Arc<dyn NotificationChannel>,
}

impl NotificationDispatcher {
    pub fn new(
        email_channel: Arc<dyn NotificationChannel>,
        telegram_channel: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            email_channel,
            telegram_channel,
        }
    }

    /// 解析接收人的通知通道
    ///
    /// 偏好Telegram但未绑定chat的用户回退到邮件；两者都不可用
    /// 返回 RecipientUnreachable（可重试，等用户绑定通道）。
    pub fn resolve_channel(&self, recipient: &User) -> PetcareResult<ReminderChannel> {
        if recipient.communication_method == CommunicationMethod::Telegram
            && recipient.telegram_chat_id.is_some()
        {
            return Ok(ReminderChannel::Telegram);
        }
        if recipient.email.is_some() {
            return Ok(ReminderChannel::Email);
        }
        Err(PetcareError::RecipientUnreachable {
            user_id: recipient.id,
        })
    }

    fn channel(&self, kind: ReminderChannel) -> &Arc<dyn NotificationChannel> {
        match kind {
            ReminderChannel::Email => &self.email_channel,
            ReminderChannel::Telegram => &self.telegram_channel,
        }
    }

    /// 发送任务提醒
    ///
    /// 机器人通道附带 Done/Skip 交互按钮，邮件通道为纯通知。
    pub async fn send_task_reminder(
        &self,
        recipient: &User,
        pet: &Pet,
        task: &Task,
    ) -> PetcareResult<DeliveryReceipt> {
        let kind = self.resolve_channel(recipient)?;
        let message = compose_reminder(recipient, pet, task);

        let actions = match kind {
            ReminderChannel::Telegram => Some(vec![
                InteractiveAction {
                    label: "完成".to_string(),
                    callback: TaskCallbackMessage::new(CallbackAction::Done, task.id),
                },
                InteractiveAction {
                    label: "跳过".to_string(),
                    callback: TaskCallbackMessage::new(CallbackAction::Skip, task.id),
                },
            ]),
            ReminderChannel::Email => None,
        };

        debug!(
            "向用户 {} 通过 {} 发送任务 {} 的提醒",
            recipient.id,
            kind.as_str(),
            task.id
        );
        self.channel(kind)
            .send(recipient, &message, actions.as_deref())
            .await
    }

    /// 发送不带交互按钮的普通通知（照护人状态变更通知等）
    pub async fn send_plain(
        &self,
        recipient: &User,
        message: &NotificationMessage,
    ) -> PetcareResult<DeliveryReceipt> {
        let kind = self.resolve_channel(recipient)?;
        self.channel(kind).send(recipient, message, None).await
    }
}

fn compose_reminder(recipient: &User, pet: &Pet, task: &Task) -> NotificationMessage {
    let due_text = match task.due_datetime {
        Some(due) => format_due_datetime(due, recipient.utc_offset()),
        None => "未设置".to_string(),
    };
    NotificationMessage {
        subject: "任务提醒".to_string(),
        body: format!(
            "提醒：宠物 {} 的任务 '{}' 将于 {} 到期",
            pet.name, task.title, due_text
        ),
    }
}
