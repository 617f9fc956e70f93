//! 基础设施层
//!
//! SQLite持久化实现与出站通知通道（邮件网关、Telegram机器人）。
//! 领域层只依赖trait，这里提供具体实现。

pub mod channels;
pub mod database;

pub use channels::{EmailChannel, TelegramChannel};
pub use database::{
    create_sqlite_pool, SqlitePetRepository, SqliteTaskRepository, SqliteUserRepository,
};
