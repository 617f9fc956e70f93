//! SQLite连接池与仓库实现

pub mod sqlite;

pub use sqlite::{SqlitePetRepository, SqliteTaskRepository, SqliteUserRepository};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::debug;

use petcare_errors::PetcareResult;

/// 创建SQLite连接池并完成建表
///
/// 启用WAL模式与外键约束，数据库文件不存在时自动创建。
pub async fn create_sqlite_pool(
    database_url: &str,
    max_connections: u32,
) -> PetcareResult<SqlitePool> {
    debug!("连接SQLite数据库: {}", database_url);

    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .connect_with(connect_options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// 运行数据库迁移
async fn run_migrations(pool: &SqlitePool) -> PetcareResult<()> {
    debug!("开始SQLite数据库迁移");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT,
            first_name TEXT,
            telegram_chat_id INTEGER,
            communication_method TEXT NOT NULL DEFAULT 'email',
            preferred_timezone TEXT,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            owner_id INTEGER NOT NULL,
            caregiver_id INTEGER,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (owner_id) REFERENCES users(id),
            FOREIGN KEY (caregiver_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pet_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            due_datetime DATETIME,
            remind_me INTEGER NOT NULL DEFAULT 0,
            remind_before TEXT,
            status TEXT NOT NULL DEFAULT 'planned',
            recurring INTEGER NOT NULL DEFAULT 0,
            recurring_days INTEGER NOT NULL DEFAULT 0,
            reminder_sent INTEGER NOT NULL DEFAULT 0,
            reminder_sent_at DATETIME,
            reminder_sent_with TEXT,
            completed_at DATETIME,
            completed_by INTEGER,
            skipped_at DATETIME,
            skipped_by INTEGER,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            created_by INTEGER NOT NULL,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at DATETIME,
            deleted_by INTEGER,
            FOREIGN KEY (pet_id) REFERENCES pets(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 提醒扫描走这条复合索引
    let indexes = vec![
        "CREATE INDEX IF NOT EXISTS idx_tasks_reminder_scan ON tasks(remind_me, reminder_sent, status)",
        "CREATE INDEX IF NOT EXISTS idx_tasks_pet_id ON tasks(pet_id)",
        "CREATE INDEX IF NOT EXISTS idx_tasks_due_datetime ON tasks(due_datetime)",
        "CREATE INDEX IF NOT EXISTS idx_pets_owner_id ON pets(owner_id)",
    ];
    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    debug!("SQLite数据库迁移完成");
    Ok(())
}
