//! Mock implementations for repository and channel traits
//!
//! These in-memory mocks can be used for unit testing without requiring
//! an actual database connection or outbound network calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use petcare_domain::entities::{Pet, ReminderChannel, Task, TaskStatus, User};
use petcare_domain::ports::{
    DeliveryReceipt, InteractiveAction, NotificationChannel, NotificationMessage,
};
use petcare_domain::repositories::{PetRepository, TaskRepository, UserRepository};
use petcare_errors::{PetcareError, PetcareResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock implementation of TaskRepository for testing
#[derive(Debug, Clone)]
pub struct MockTaskRepository {
    tasks: Arc<Mutex<HashMap<i64, Task>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockTaskRepository {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let mut task_map = HashMap::new();
        let mut max_id = 0;

        for task in tasks {
            if task.id > max_id {
                max_id = task.id;
            }
            task_map.insert(task.id, task);
        }

        Self {
            tasks: Arc::new(Mutex::new(task_map)),
            next_id: Arc::new(Mutex::new(max_id + 1)),
        }
    }

    pub fn count(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub fn get_all_tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().values().cloned().collect()
    }

    /// Direct read without going through the async trait, for assertions
    pub fn get_task(&self, id: i64) -> Option<Task> {
        self.tasks.lock().unwrap().get(&id).cloned()
    }
}

impl Default for MockTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn create(&self, task: &Task) -> PetcareResult<Task> {
        let mut tasks = self.tasks.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();

        let mut new_task = task.clone();
        new_task.id = *next_id;
        *next_id += 1;

        tasks.insert(new_task.id, new_task.clone());
        Ok(new_task)
    }

    async fn get_by_id(&self, id: i64) -> PetcareResult<Option<Task>> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.get(&id).cloned())
    }

    async fn update(&self, task: &Task) -> PetcareResult<()> {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn find_reminder_candidates(&self) -> PetcareResult<Vec<Task>> {
        let tasks = self.tasks.lock().unwrap();
        let mut candidates: Vec<Task> = tasks
            .values()
            .filter(|t| {
                t.remind_me
                    && !t.reminder_sent
                    && t.due_datetime.is_some()
                    && matches!(t.status, TaskStatus::Planned | TaskStatus::Overdue)
                    && t.deleted_at.is_none()
            })
            .cloned()
            .collect();
        candidates.sort_by_key(|t| t.id);
        Ok(candidates)
    }

    async fn claim_reminder(
        &self,
        task_id: i64,
        channel: ReminderChannel,
        sent_at: DateTime<Utc>,
    ) -> PetcareResult<bool> {
        let mut tasks = self.tasks.lock().unwrap();
        match tasks.get_mut(&task_id) {
            Some(task) if !task.reminder_sent => {
                task.reminder_sent = true;
                task.reminder_sent_at = Some(sent_at);
                task.reminder_sent_with = Some(channel);
                task.updated_at = sent_at;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn release_reminder_claim(&self, task_id: i64) -> PetcareResult<()> {
        let mut tasks = self.tasks.lock().unwrap();
        if let Some(task) = tasks.get_mut(&task_id) {
            task.reminder_sent = false;
            task.reminder_sent_at = None;
            task.reminder_sent_with = None;
        }
        Ok(())
    }
}

/// Mock implementation of PetRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockPetRepository {
    pets: Arc<Mutex<HashMap<i64, Pet>>>,
}

impl MockPetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pets(pets: Vec<Pet>) -> Self {
        let map = pets.into_iter().map(|p| (p.id, p)).collect();
        Self {
            pets: Arc::new(Mutex::new(map)),
        }
    }

    pub fn insert(&self, pet: Pet) {
        self.pets.lock().unwrap().insert(pet.id, pet);
    }
}

#[async_trait]
impl PetRepository for MockPetRepository {
    async fn get_by_id(&self, id: i64) -> PetcareResult<Option<Pet>> {
        Ok(self.pets.lock().unwrap().get(&id).cloned())
    }
}

/// Mock implementation of UserRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<HashMap<i64, User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let map = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: Arc::new(Mutex::new(map)),
        }
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn get_by_id(&self, id: i64) -> PetcareResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

/// A notification captured by [`MockNotificationChannel`]
#[derive(Debug, Clone)]
pub struct RecordedNotification {
    pub recipient_id: i64,
    pub subject: String,
    pub body: String,
    pub actions: Vec<InteractiveAction>,
}

/// Mock notification channel that records sends and can simulate
/// transport failures.
#[derive(Clone)]
pub struct MockNotificationChannel {
    kind: ReminderChannel,
    sent: Arc<Mutex<Vec<RecordedNotification>>>,
    fail_sends: Arc<Mutex<bool>>,
}

impl MockNotificationChannel {
    pub fn new(kind: ReminderChannel) -> Self {
        Self {
            kind,
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_sends: Arc::new(Mutex::new(false)),
        }
    }

    /// When set, every send fails with a retryable notification error
    pub fn set_failing(&self, failing: bool) {
        *self.fail_sends.lock().unwrap() = failing;
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent_notifications(&self) -> Vec<RecordedNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_sent(&self) -> Option<RecordedNotification> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl NotificationChannel for MockNotificationChannel {
    fn kind(&self) -> ReminderChannel {
        self.kind
    }

    async fn send(
        &self,
        recipient: &User,
        message: &NotificationMessage,
        actions: Option<&[InteractiveAction]>,
    ) -> PetcareResult<DeliveryReceipt> {
        if *self.fail_sends.lock().unwrap() {
            return Err(PetcareError::Notification(
                "simulated transport failure".to_string(),
            ));
        }

        self.sent.lock().unwrap().push(RecordedNotification {
            recipient_id: recipient.id,
            subject: message.subject.clone(),
            body: message.body.clone(),
            actions: actions.map(<[InteractiveAction]>::to_vec).unwrap_or_default(),
        });

        Ok(DeliveryReceipt {
            channel: self.kind,
            delivered_at: Utc::now(),
        })
    }
}
