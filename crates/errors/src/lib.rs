use thiserror::Error;

#[derive(Debug, Error)]
pub enum PetcareError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("任务未找到: {id}")]
    TaskNotFound { id: i64 },
    #[error("宠物未找到: {id}")]
    PetNotFound { id: i64 },
    #[error("用户未找到: {id}")]
    UserNotFound { id: i64 },
    #[error("任务 {id} 当前状态为 {status}，不允许该状态变更")]
    InvalidTransition { id: i64, status: String },
    #[error("任务 {id} 已被删除，不允许操作")]
    TaskDeleted { id: i64 },
    #[error("用户 {user_id} 没有可用的通知通道")]
    RecipientUnreachable { user_id: i64 },
    #[error("通知发送失败: {0}")]
    Notification(String),
    #[error("网络错误: {0}")]
    Network(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("数据验证失败: {0}")]
    ValidationError(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type PetcareResult<T> = Result<T, PetcareError>;

impl PetcareError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn task_not_found(id: i64) -> Self {
        Self::TaskNotFound { id }
    }
    pub fn pet_not_found(id: i64) -> Self {
        Self::PetNotFound { id }
    }
    pub fn user_not_found(id: i64) -> Self {
        Self::UserNotFound { id }
    }
    pub fn invalid_transition(id: i64, status: impl Into<String>) -> Self {
        Self::InvalidTransition {
            id,
            status: status.into(),
        }
    }
    pub fn notification_error<S: Into<String>>(msg: S) -> Self {
        Self::Notification(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::ValidationError(msg.into())
    }
    /// 可重试错误：下一轮提醒扫描会自动重试，不需要人工介入
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PetcareError::DatabaseOperation(_)
                | PetcareError::Notification(_)
                | PetcareError::Network(_)
                | PetcareError::RecipientUnreachable { .. }
        )
    }
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PetcareError::Internal(_) | PetcareError::Configuration(_)
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            PetcareError::TaskNotFound { .. } => "请求的任务不存在",
            PetcareError::PetNotFound { .. } => "请求的宠物不存在",
            PetcareError::UserNotFound { .. } => "请求的用户不存在",
            PetcareError::InvalidTransition { .. } => "无法更新——任务已处于终态",
            PetcareError::TaskDeleted { .. } => "无法更新——任务已被删除",
            PetcareError::RecipientUnreachable { .. } => "接收人未绑定任何通知通道",
            PetcareError::ValidationError(_) => "输入数据验证失败",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for PetcareError {
    fn from(err: serde_json::Error) -> Self {
        PetcareError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for PetcareError {
    fn from(err: reqwest::Error) -> Self {
        PetcareError::Network(err.to_string())
    }
}

impl From<anyhow::Error> for PetcareError {
    fn from(err: anyhow::Error) -> Self {
        PetcareError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(PetcareError::Notification("timeout".into()).is_retryable());
        assert!(PetcareError::Network("dns".into()).is_retryable());
        assert!(PetcareError::RecipientUnreachable { user_id: 1 }.is_retryable());
        assert!(!PetcareError::TaskNotFound { id: 1 }.is_retryable());
        assert!(!PetcareError::InvalidTransition {
            id: 1,
            status: "done".into()
        }
        .is_retryable());
    }

    #[test]
    fn fatal_classification() {
        assert!(PetcareError::Configuration("bad".into()).is_fatal());
        assert!(!PetcareError::Notification("x".into()).is_fatal());
    }
}
