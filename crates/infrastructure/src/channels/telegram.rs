//! Telegram机器人通道
//!
//! 走Bot API的sendMessage。提醒消息附带内联键盘，按钮的
//! callback_data 是结构化JSON载荷，回传后由控制器解析路由。

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use petcare_domain::entities::{ReminderChannel, User};
use petcare_domain::ports::{
    DeliveryReceipt, InteractiveAction, NotificationChannel, NotificationMessage,
};
use petcare_errors::{PetcareError, PetcareResult};

pub struct TelegramChannel {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl TelegramChannel {
    pub fn new(api_base: String, bot_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            bot_token,
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

/// 组装sendMessage请求体
fn build_send_message_payload(
    chat_id: i64,
    message: &NotificationMessage,
    actions: Option<&[InteractiveAction]>,
) -> PetcareResult<Value> {
    let mut payload = json!({
        "chat_id": chat_id,
        "text": format!("{}\n\n{}", message.subject, message.body),
    });

    if let Some(actions) = actions {
        let buttons = actions
            .iter()
            .map(|action| {
                Ok(json!({
                    "text": action.label,
                    "callback_data": action.callback.to_json()?,
                }))
            })
            .collect::<PetcareResult<Vec<Value>>>()?;
        payload["reply_markup"] = json!({ "inline_keyboard": [buttons] });
    }

    Ok(payload)
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn kind(&self) -> ReminderChannel {
        ReminderChannel::Telegram
    }

    #[instrument(skip(self, message, actions), fields(user_id = %recipient.id))]
    async fn send(
        &self,
        recipient: &User,
        message: &NotificationMessage,
        actions: Option<&[InteractiveAction]>,
    ) -> PetcareResult<DeliveryReceipt> {
        let chat_id = recipient
            .telegram_chat_id
            .ok_or(PetcareError::RecipientUnreachable {
                user_id: recipient.id,
            })?;

        let payload = build_send_message_payload(chat_id, message, actions)?;
        let response = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PetcareError::Notification(format!(
                "Telegram API返回 {status}: {body}"
            )));
        }

        debug!("Telegram消息已发送到 chat {}", chat_id);
        Ok(DeliveryReceipt {
            channel: ReminderChannel::Telegram,
            delivered_at: Utc::now(),
        })
    }
}
