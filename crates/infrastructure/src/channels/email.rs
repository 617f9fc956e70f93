//! 邮件通道
//!
//! 通过HTTP邮件网关发送，不直接说SMTP。网关确认接收（2xx）
//! 才算发送成功。

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use petcare_domain::entities::{ReminderChannel, User};
use petcare_domain::ports::{
    DeliveryReceipt, InteractiveAction, NotificationChannel, NotificationMessage,
};
use petcare_errors::{PetcareError, PetcareResult};

pub struct EmailChannel {
    client: reqwest::Client,
    gateway_url: String,
    from_address: String,
}

impl EmailChannel {
    pub fn new(gateway_url: String, from_address: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url,
            from_address,
        }
    }
}

fn build_mail_payload(from: &str, to: &str, message: &NotificationMessage) -> Value {
    json!({
        "from": from,
        "to": to,
        "subject": message.subject,
        "text": message.body,
    })
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn kind(&self) -> ReminderChannel {
        ReminderChannel::Email
    }

    /// 邮件不支持交互按钮，actions 被忽略
    #[instrument(skip(self, message, _actions), fields(user_id = %recipient.id))]
    async fn send(
        &self,
        recipient: &User,
        message: &NotificationMessage,
        _actions: Option<&[InteractiveAction]>,
    ) -> PetcareResult<DeliveryReceipt> {
        let to = recipient
            .email
            .as_deref()
            .ok_or(PetcareError::RecipientUnreachable {
                user_id: recipient.id,
            })?;

        let payload = build_mail_payload(&self.from_address, to, message);
        let response = self
            .client
            .post(&self.gateway_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PetcareError::Notification(format!(
                "邮件网关返回 {status}: {body}"
            )));
        }

        debug!("邮件已提交网关，收件人 {}", to);
        Ok(DeliveryReceipt {
            channel: ReminderChannel::Email,
            delivered_at: Utc::now(),
        })
    }
}
