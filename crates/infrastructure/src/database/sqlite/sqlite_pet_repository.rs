use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use petcare_domain::entities::Pet;
use petcare_domain::repositories::PetRepository;
use petcare_errors::PetcareResult;

pub struct SqlitePetRepository {
    pool: SqlitePool,
}

impl SqlitePetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 写入宠物记录。宠物管理属于外围系统，这里只用于初始化和测试。
    pub async fn create(&self, pet: &Pet) -> PetcareResult<Pet> {
        let row = sqlx::query(
            r#"
            INSERT INTO pets (name, owner_id, caregiver_id, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, owner_id, caregiver_id, created_at
            "#,
        )
        .bind(&pet.name)
        .bind(pet.owner_id)
        .bind(pet.caregiver_id)
        .bind(pet.created_at)
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_pet(&row)
    }

    fn row_to_pet(row: &sqlx::sqlite::SqliteRow) -> PetcareResult<Pet> {
        Ok(Pet {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            owner_id: row.try_get("owner_id")?,
            caregiver_id: row.try_get("caregiver_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl PetRepository for SqlitePetRepository {
    async fn get_by_id(&self, id: i64) -> PetcareResult<Option<Pet>> {
        let row = sqlx::query(
            "SELECT id, name, owner_id, caregiver_id, created_at FROM pets WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::row_to_pet).transpose()
    }
}
