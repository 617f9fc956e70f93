use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use petcare_domain::entities::User;
use petcare_domain::repositories::UserRepository;
use petcare_errors::PetcareResult;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 写入用户记录。账号管理属于外围系统，这里只用于初始化和测试。
    pub async fn create(&self, user: &User) -> PetcareResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, first_name, telegram_chat_id, communication_method,
                preferred_timezone, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, email, first_name, telegram_chat_id, communication_method,
                preferred_timezone, created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(user.telegram_chat_id)
        .bind(user.communication_method)
        .bind(&user.preferred_timezone)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_user(&row)
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> PetcareResult<User> {
        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            telegram_chat_id: row.try_get("telegram_chat_id")?,
            communication_method: row.try_get("communication_method")?,
            preferred_timezone: row.try_get("preferred_timezone")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_by_id(&self, id: i64) -> PetcareResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, first_name, telegram_chat_id, communication_method,
                preferred_timezone, created_at
            FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::row_to_user).transpose()
    }
}
