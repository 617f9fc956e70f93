use chrono::{TimeZone, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;

use petcare_domain::entities::{
    CommunicationMethod, Pet, RemindBefore, ReminderChannel, TaskStatus, User,
};
use petcare_domain::repositories::{PetRepository, TaskRepository, UserRepository};
use petcare_infrastructure::database::{
    create_sqlite_pool, SqlitePetRepository, SqliteTaskRepository, SqliteUserRepository,
};
use petcare_testing_utils::TaskBuilder;

async fn setup() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("petcare_test.db").display());
    let pool = create_sqlite_pool(&url, 5).await.unwrap();
    (dir, pool)
}

/// 建一个用户和一只宠物，返回宠物ID供任务外键引用
async fn seed_owner_and_pet(pool: &SqlitePool) -> i64 {
    let users = SqliteUserRepository::new(pool.clone());
    let owner = users
        .create(&User {
            id: 0,
            email: Some("owner@example.com".to_string()),
            first_name: Some("Ира".to_string()),
            telegram_chat_id: None,
            communication_method: CommunicationMethod::Email,
            preferred_timezone: Some("+03:00".to_string()),
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let pets = SqlitePetRepository::new(pool.clone());
    let pet = pets
        .create(&Pet {
            id: 0,
            name: "Барсик".to_string(),
            owner_id: owner.id,
            caregiver_id: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    pet.id
}

#[tokio::test]
async fn task_round_trip_preserves_fields() {
    let (_dir, pool) = setup().await;
    let pet_id = seed_owner_and_pet(&pool).await;
    let repo = SqliteTaskRepository::new(pool);

    let due = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let task = TaskBuilder::new()
        .with_pet_id(pet_id)
        .with_title("接种疫苗")
        .with_due(due)
        .with_reminder(RemindBefore::OneDay)
        .recurring(3)
        .build();

    let created = repo.create(&task).await.unwrap();
    assert!(created.id > 0);

    let loaded = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(loaded.pet_id, pet_id);
    assert_eq!(loaded.title, "接种疫苗");
    assert_eq!(loaded.due_datetime, Some(due));
    assert!(loaded.remind_me);
    assert_eq!(loaded.remind_before, Some(RemindBefore::OneDay));
    assert_eq!(loaded.status, TaskStatus::Planned);
    assert!(loaded.recurring);
    assert_eq!(loaded.recurring_days, 3);
    assert!(!loaded.reminder_sent);
    assert!(loaded.reminder_sent_at.is_none());
    assert!(loaded.deleted_at.is_none());
}

#[tokio::test]
async fn get_by_id_returns_none_for_unknown_task() {
    let (_dir, pool) = setup().await;
    let repo = SqliteTaskRepository::new(pool);
    assert!(repo.get_by_id(404).await.unwrap().is_none());
}

#[tokio::test]
async fn update_persists_terminal_state() {
    let (_dir, pool) = setup().await;
    let pet_id = seed_owner_and_pet(&pool).await;
    let repo = SqliteTaskRepository::new(pool);

    let mut task = repo
        .create(&TaskBuilder::new().with_pet_id(pet_id).build())
        .await
        .unwrap();
    task.mark_as_done(1).unwrap();
    repo.update(&task).await.unwrap();

    let loaded = repo.get_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, TaskStatus::Done);
    assert_eq!(loaded.completed_by, Some(1));
    assert!(loaded.completed_at.is_some());
}

#[tokio::test]
async fn reminder_candidates_exclude_ineligible_tasks() {
    let (_dir, pool) = setup().await;
    let pet_id = seed_owner_and_pet(&pool).await;
    let repo = SqliteTaskRepository::new(pool);

    let due = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let eligible = repo
        .create(
            &TaskBuilder::new()
                .with_pet_id(pet_id)
                .with_due(due)
                .with_reminder(RemindBefore::OneHour)
                .build(),
        )
        .await
        .unwrap();
    let overdue = repo
        .create(
            &TaskBuilder::new()
                .with_pet_id(pet_id)
                .with_due(due)
                .with_reminder(RemindBefore::OneHour)
                .with_status(TaskStatus::Overdue)
                .build(),
        )
        .await
        .unwrap();
    // 以下都不应出现在候选里
    repo.create(
        &TaskBuilder::new()
            .with_pet_id(pet_id)
            .with_due(due)
            .without_reminder()
            .build(),
    )
    .await
    .unwrap();
    repo.create(
        &TaskBuilder::new()
            .with_pet_id(pet_id)
            .without_due()
            .with_reminder(RemindBefore::OneHour)
            .build(),
    )
    .await
    .unwrap();
    repo.create(
        &TaskBuilder::new()
            .with_pet_id(pet_id)
            .with_due(due)
            .with_reminder(RemindBefore::OneHour)
            .with_status(TaskStatus::Done)
            .build(),
    )
    .await
    .unwrap();
    repo.create(
        &TaskBuilder::new()
            .with_pet_id(pet_id)
            .with_due(due)
            .with_reminder(RemindBefore::OneHour)
            .reminder_already_sent()
            .build(),
    )
    .await
    .unwrap();
    repo.create(
        &TaskBuilder::new()
            .with_pet_id(pet_id)
            .with_due(due)
            .with_reminder(RemindBefore::OneHour)
            .deleted_by(1)
            .build(),
    )
    .await
    .unwrap();

    let candidates = repo.find_reminder_candidates().await.unwrap();
    let mut ids: Vec<i64> = candidates.iter().map(|t| t.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![eligible.id, overdue.id]);
}

#[tokio::test]
async fn claim_reminder_succeeds_exactly_once() {
    let (_dir, pool) = setup().await;
    let pet_id = seed_owner_and_pet(&pool).await;
    let repo = SqliteTaskRepository::new(pool);

    let task = repo
        .create(
            &TaskBuilder::new()
                .with_pet_id(pet_id)
                .with_due(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
                .with_reminder(RemindBefore::FifteenMin)
                .build(),
        )
        .await
        .unwrap();

    let sent_at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 45, 0).unwrap();
    let claimed = repo
        .claim_reminder(task.id, ReminderChannel::Telegram, sent_at)
        .await
        .unwrap();
    assert!(claimed);

    // 第二次认领必须失败
    let claimed_again = repo
        .claim_reminder(task.id, ReminderChannel::Email, sent_at)
        .await
        .unwrap();
    assert!(!claimed_again);

    let loaded = repo.get_by_id(task.id).await.unwrap().unwrap();
    assert!(loaded.reminder_sent);
    assert_eq!(loaded.reminder_sent_at, Some(sent_at));
    assert_eq!(loaded.reminder_sent_with, Some(ReminderChannel::Telegram));
    // 候选查询不再返回它
    assert!(repo.find_reminder_candidates().await.unwrap().is_empty());
}

#[tokio::test]
async fn released_claim_is_claimable_again() {
    let (_dir, pool) = setup().await;
    let pet_id = seed_owner_and_pet(&pool).await;
    let repo = SqliteTaskRepository::new(pool);

    let task = repo
        .create(
            &TaskBuilder::new()
                .with_pet_id(pet_id)
                .with_due(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
                .with_reminder(RemindBefore::FifteenMin)
                .build(),
        )
        .await
        .unwrap();

    let sent_at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 45, 0).unwrap();
    assert!(repo
        .claim_reminder(task.id, ReminderChannel::Email, sent_at)
        .await
        .unwrap());

    repo.release_reminder_claim(task.id).await.unwrap();

    let loaded = repo.get_by_id(task.id).await.unwrap().unwrap();
    assert!(!loaded.reminder_sent);
    assert!(loaded.reminder_sent_at.is_none());
    assert!(loaded.reminder_sent_with.is_none());

    assert_eq!(repo.find_reminder_candidates().await.unwrap().len(), 1);
    assert!(repo
        .claim_reminder(task.id, ReminderChannel::Email, sent_at)
        .await
        .unwrap());
}

#[tokio::test]
async fn user_and_pet_round_trip() {
    let (_dir, pool) = setup().await;
    let users = SqliteUserRepository::new(pool.clone());
    let pets = SqlitePetRepository::new(pool.clone());

    let owner = users
        .create(&User {
            id: 0,
            email: None,
            first_name: None,
            telegram_chat_id: Some(777),
            communication_method: CommunicationMethod::Telegram,
            preferred_timezone: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    let caregiver = users
        .create(&User {
            id: 0,
            email: Some("care@example.com".to_string()),
            first_name: Some("Анна".to_string()),
            telegram_chat_id: None,
            communication_method: CommunicationMethod::Email,
            preferred_timezone: Some("+05:00".to_string()),
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let loaded = users.get_by_id(owner.id).await.unwrap().unwrap();
    assert_eq!(loaded.telegram_chat_id, Some(777));
    assert_eq!(loaded.communication_method, CommunicationMethod::Telegram);
    assert!(loaded.email.is_none());

    let pet = pets
        .create(&Pet {
            id: 0,
            name: "Шарик".to_string(),
            owner_id: owner.id,
            caregiver_id: Some(caregiver.id),
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let loaded_pet = pets.get_by_id(pet.id).await.unwrap().unwrap();
    assert_eq!(loaded_pet.name, "Шарик");
    assert_eq!(loaded_pet.owner_id, owner.id);
    assert_eq!(loaded_pet.caregiver_id, Some(caregiver.id));
    assert_eq!(loaded_pet.reminder_recipient_id(), caregiver.id);

    assert!(users.get_by_id(9999).await.unwrap().is_none());
    assert!(pets.get_by_id(9999).await.unwrap().is_none());
}
