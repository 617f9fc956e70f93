//! 机器人交互回调的结构化载荷
//!
//! 提醒消息里的 Done/Skip 按钮携带该载荷，回传后路由回
//! `update_task_status`。刻意不使用分隔符字符串这类序列化技巧。

use chrono::{DateTime, Utc};
use petcare_errors::PetcareResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CallbackAction {
    #[serde(rename = "done")]
    Done,
    #[serde(rename = "skip")]
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskCallbackMessage {
    pub action: CallbackAction,
    pub task_id: i64,
    pub timestamp: DateTime<Utc>,
}

impl TaskCallbackMessage {
    pub fn new(action: CallbackAction, task_id: i64) -> Self {
        Self {
            action,
            task_id,
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> PetcareResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(payload: &str) -> PetcareResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_payload_shape() {
        let message = TaskCallbackMessage::new(CallbackAction::Done, 123);
        let json = message.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["action"], "done");
        assert_eq!(value["task_id"], 123);
        assert!(value["timestamp"].is_string());

        let parsed = TaskCallbackMessage::from_json(&json).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(TaskCallbackMessage::from_json("DONE:123").is_err());
    }
}
