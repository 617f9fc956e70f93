//! 照护人状态变更的主人通知
//!
//! 仅在任务更新（而非创建）后、且由照护人执行终态变更时触发，
//! 通过主人的通道发送不带交互按钮的简短消息。

use std::sync::Arc;

use tracing::debug;

use petcare_domain::entities::{Pet, Task, TaskStatus, User};
use petcare_domain::ports::{DeliveryReceipt, NotificationMessage};
use petcare_errors::PetcareResult;

use crate::notifier::NotificationDispatcher;

pub struct CaretakerNotifier {
    dispatcher: Arc<NotificationDispatcher>,
}

impl CaretakerNotifier {
    pub fn new(dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// 条件满足时向主人发送一条状态变更通知
    ///
    /// 触发条件：宠物有照护人、操作者就是该照护人、任务刚进入
    /// done/skipped 且对应的 completed_by/skipped_by 是照护人。
    /// 条件不满足返回 Ok(None)。
    pub async fn notify_owner_after_update(
        &self,
        task: &Task,
        pet: &Pet,
        actor: &User,
        owner: &User,
    ) -> PetcareResult<Option<DeliveryReceipt>> {
        if pet.caregiver_id != Some(actor.id) || actor.id == owner.id {
            return Ok(None);
        }

        let status_text = match task.status {
            TaskStatus::Done if task.completed_by == Some(actor.id) => "已完成",
            TaskStatus::Skipped if task.skipped_by == Some(actor.id) => "已跳过",
            _ => {
                debug!(
                    "任务 {} 状态 {} 不满足主人通知条件",
                    task.id,
                    task.status.as_str()
                );
                return Ok(None);
            }
        };

        let message = NotificationMessage {
            subject: "照护人更新了任务".to_string(),
            body: format!(
                "您的照护人 {} 已将宠物 {} 的任务 '{}' 标记为{}",
                actor.display_name(),
                pet.name,
                task.title,
                status_text
            ),
        };

        let receipt = self.dispatcher.send_plain(owner, &message).await?;
        debug!(
            "任务 {} 的照护人更新通知已发送给主人 {}",
            task.id, owner.id
        );
        Ok(Some(receipt))
    }
}
