use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use petcare_domain::entities::{ReminderChannel, Task};
use petcare_domain::repositories::TaskRepository;
use petcare_errors::PetcareResult;

const TASK_COLUMNS: &str = "id, pet_id, title, due_datetime, remind_me, remind_before, status, \
     recurring, recurring_days, reminder_sent, reminder_sent_at, reminder_sent_with, \
     completed_at, completed_by, skipped_at, skipped_by, \
     created_at, created_by, updated_at, deleted_at, deleted_by";

pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> PetcareResult<Task> {
        Ok(Task {
            id: row.try_get("id")?,
            pet_id: row.try_get("pet_id")?,
            title: row.try_get("title")?,
            due_datetime: row.try_get("due_datetime")?,
            remind_me: row.try_get("remind_me")?,
            remind_before: row.try_get("remind_before")?,
            status: row.try_get("status")?,
            recurring: row.try_get("recurring")?,
            recurring_days: row.try_get("recurring_days")?,
            reminder_sent: row.try_get("reminder_sent")?,
            reminder_sent_at: row.try_get("reminder_sent_at")?,
            reminder_sent_with: row.try_get("reminder_sent_with")?,
            completed_at: row.try_get("completed_at")?,
            completed_by: row.try_get("completed_by")?,
            skipped_at: row.try_get("skipped_at")?,
            skipped_by: row.try_get("skipped_by")?,
            created_at: row.try_get("created_at")?,
            created_by: row.try_get("created_by")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
            deleted_by: row.try_get("deleted_by")?,
        })
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    #[instrument(skip(self, task), fields(pet_id = %task.pet_id))]
    async fn create(&self, task: &Task) -> PetcareResult<Task> {
        let sql = format!(
            r#"
            INSERT INTO tasks (pet_id, title, due_datetime, remind_me, remind_before, status,
                recurring, recurring_days, reminder_sent, reminder_sent_at, reminder_sent_with,
                completed_at, completed_by, skipped_at, skipped_by,
                created_at, created_by, updated_at, deleted_at, deleted_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {TASK_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(task.pet_id)
            .bind(&task.title)
            .bind(task.due_datetime)
            .bind(task.remind_me)
            .bind(task.remind_before)
            .bind(task.status)
            .bind(task.recurring)
            .bind(task.recurring_days)
            .bind(task.reminder_sent)
            .bind(task.reminder_sent_at)
            .bind(task.reminder_sent_with)
            .bind(task.completed_at)
            .bind(task.completed_by)
            .bind(task.skipped_at)
            .bind(task.skipped_by)
            .bind(task.created_at)
            .bind(task.created_by)
            .bind(task.updated_at)
            .bind(task.deleted_at)
            .bind(task.deleted_by)
            .fetch_one(&self.pool)
            .await?;

        let created = Self::row_to_task(&row)?;
        debug!("已创建{}", created.entity_description());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> PetcareResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(Self::row_to_task).transpose()
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn update(&self, task: &Task) -> PetcareResult<()> {
        sqlx::query(
            r#"
            UPDATE tasks SET
                title = ?, due_datetime = ?, remind_me = ?, remind_before = ?, status = ?,
                recurring = ?, recurring_days = ?,
                reminder_sent = ?, reminder_sent_at = ?, reminder_sent_with = ?,
                completed_at = ?, completed_by = ?, skipped_at = ?, skipped_by = ?,
                updated_at = ?, deleted_at = ?, deleted_by = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.title)
        .bind(task.due_datetime)
        .bind(task.remind_me)
        .bind(task.remind_before)
        .bind(task.status)
        .bind(task.recurring)
        .bind(task.recurring_days)
        .bind(task.reminder_sent)
        .bind(task.reminder_sent_at)
        .bind(task.reminder_sent_with)
        .bind(task.completed_at)
        .bind(task.completed_by)
        .bind(task.skipped_at)
        .bind(task.skipped_by)
        .bind(task.updated_at)
        .bind(task.deleted_at)
        .bind(task.deleted_by)
        .bind(task.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// 粗筛提醒候选，时间窗口判断留给扫描器
    async fn find_reminder_candidates(&self) -> PetcareResult<Vec<Task>> {
        let sql = format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            WHERE remind_me = 1
              AND reminder_sent = 0
              AND due_datetime IS NOT NULL
              AND status IN ('planned', 'overdue')
              AND deleted_at IS NULL
            ORDER BY due_datetime
            "#
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_task).collect()
    }

    /// 原子认领提醒：只有 reminder_sent 仍为0的那次更新会成功，
    /// 并发扫描中最多一个调用方拿到 true。
    #[instrument(skip(self))]
    async fn claim_reminder(
        &self,
        task_id: i64,
        channel: ReminderChannel,
        sent_at: DateTime<Utc>,
    ) -> PetcareResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET reminder_sent = 1, reminder_sent_at = ?, reminder_sent_with = ?, updated_at = ?
            WHERE id = ? AND reminder_sent = 0
            "#,
        )
        .bind(sent_at)
        .bind(channel)
        .bind(sent_at)
        .bind(task_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn release_reminder_claim(&self, task_id: i64) -> PetcareResult<()> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET reminder_sent = 0, reminder_sent_at = NULL, reminder_sent_with = NULL
            WHERE id = ?
            "#,
        )
        .bind(task_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
