use std::sync::Arc;

use petcare_dispatcher::{CaretakerNotifier, NotificationDispatcher};
use petcare_domain::entities::{Pet, ReminderChannel, Task, TaskStatus, User};
use petcare_errors::PetcareError;
use petcare_testing_utils::{
    MockNotificationChannel, PetBuilder, TaskBuilder, UserBuilder,
};

struct Fixture {
    notifier: CaretakerNotifier,
    email: Arc<MockNotificationChannel>,
    telegram: Arc<MockNotificationChannel>,
}

fn fixture() -> Fixture {
    let email = Arc::new(MockNotificationChannel::new(ReminderChannel::Email));
    let telegram = Arc::new(MockNotificationChannel::new(ReminderChannel::Telegram));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        email.clone(),
        telegram.clone(),
    ));
    Fixture {
        notifier: CaretakerNotifier::new(dispatcher),
        email,
        telegram,
    }
}

fn owner() -> User {
    UserBuilder::new().with_id(1).build()
}

fn caregiver() -> User {
    UserBuilder::new()
        .with_id(2)
        .with_email("care@example.com")
        .with_first_name("Анна")
        .build()
}

fn shared_pet() -> Pet {
    PetBuilder::new()
        .with_id(1)
        .with_owner(1)
        .with_caregiver(2)
        .build()
}

fn done_by(actor_id: i64) -> Task {
    let mut task = TaskBuilder::new().with_title("喂药").build();
    task.mark_as_done(actor_id).unwrap();
    task
}

#[tokio::test]
async fn caregiver_completion_notifies_owner() {
    let f = fixture();
    let task = done_by(2);

    let receipt = f
        .notifier
        .notify_owner_after_update(&task, &shared_pet(), &caregiver(), &owner())
        .await
        .unwrap();

    assert!(receipt.is_some());
    assert_eq!(f.email.sent_count(), 1);
    let sent = f.email.last_sent().unwrap();
    assert_eq!(sent.recipient_id, 1);
    assert!(sent.body.contains("Анна"));
    assert!(sent.body.contains("Barsik"));
    assert!(sent.body.contains("喂药"));
    assert!(sent.body.contains("已完成"));
}

#[tokio::test]
async fn caregiver_skip_notifies_owner_with_skip_wording() {
    let f = fixture();
    let mut task = TaskBuilder::new().build();
    task.mark_as_skipped(2).unwrap();

    let receipt = f
        .notifier
        .notify_owner_after_update(&task, &shared_pet(), &caregiver(), &owner())
        .await
        .unwrap();

    assert!(receipt.is_some());
    assert!(f.email.last_sent().unwrap().body.contains("已跳过"));
}

#[tokio::test]
async fn pet_without_caregiver_produces_nothing() {
    let f = fixture();
    let pet = PetBuilder::new().with_id(1).with_owner(1).build();
    let task = done_by(2);

    let receipt = f
        .notifier
        .notify_owner_after_update(&task, &pet, &caregiver(), &owner())
        .await
        .unwrap();

    assert!(receipt.is_none());
    assert_eq!(f.email.sent_count(), 0);
}

#[tokio::test]
async fn actor_other_than_caregiver_produces_nothing() {
    let f = fixture();
    let stranger = UserBuilder::new().with_id(9).build();
    let task = done_by(9);

    let receipt = f
        .notifier
        .notify_owner_after_update(&task, &shared_pet(), &stranger, &owner())
        .await
        .unwrap();

    assert!(receipt.is_none());
    assert_eq!(f.email.sent_count(), 0);
}

#[tokio::test]
async fn caregiver_who_is_also_owner_produces_nothing() {
    let f = fixture();
    let pet = PetBuilder::new()
        .with_id(1)
        .with_owner(2)
        .with_caregiver(2)
        .build();
    let task = done_by(2);
    let actor = caregiver();

    let receipt = f
        .notifier
        .notify_owner_after_update(&task, &pet, &actor, &actor)
        .await
        .unwrap();

    assert!(receipt.is_none());
    assert_eq!(f.email.sent_count(), 0);
}

#[tokio::test]
async fn non_terminal_status_produces_nothing() {
    let f = fixture();
    let task = TaskBuilder::new().with_status(TaskStatus::Planned).build();

    let receipt = f
        .notifier
        .notify_owner_after_update(&task, &shared_pet(), &caregiver(), &owner())
        .await
        .unwrap();

    assert!(receipt.is_none());
}

#[tokio::test]
async fn completion_by_someone_else_produces_nothing() {
    let f = fixture();
    // 终态是别人标记的，照护人只是碰巧触发了更新路径
    let task = done_by(7);

    let receipt = f
        .notifier
        .notify_owner_after_update(&task, &shared_pet(), &caregiver(), &owner())
        .await
        .unwrap();

    assert!(receipt.is_none());
}

#[tokio::test]
async fn owner_channel_preference_is_honored() {
    let f = fixture();
    let owner = UserBuilder::new().with_id(1).with_telegram(555).build();
    let task = done_by(2);

    f.notifier
        .notify_owner_after_update(&task, &shared_pet(), &caregiver(), &owner)
        .await
        .unwrap();

    assert_eq!(f.telegram.sent_count(), 1);
    assert_eq!(f.email.sent_count(), 0);
}

#[tokio::test]
async fn channel_failure_propagates_to_caller() {
    let f = fixture();
    f.email.set_failing(true);
    let task = done_by(2);

    let err = f
        .notifier
        .notify_owner_after_update(&task, &shared_pet(), &caregiver(), &owner())
        .await
        .unwrap_err();

    assert!(matches!(err, PetcareError::Notification(_)));
}
