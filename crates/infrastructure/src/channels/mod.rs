//! 出站通知通道实现

pub mod email;
pub mod telegram;

pub use email::EmailChannel;
pub use telegram::TelegramChannel;
