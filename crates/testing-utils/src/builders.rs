//! Test data builders for creating test entities
//!
//! Builder patterns with sensible defaults and easy customization.

use chrono::{DateTime, Utc};
use petcare_domain::entities::{
    CommunicationMethod, Pet, RemindBefore, Task, TaskStatus, User,
};

/// Builder for creating test Task entities
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new() -> Self {
        let mut task = Task::new(1, "feed the cat".to_string(), 1);
        task.id = 1;
        Self { task }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.task.id = id;
        self
    }

    pub fn with_pet_id(mut self, pet_id: i64) -> Self {
        self.task.pet_id = pet_id;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.task.title = title.to_string();
        self
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.task.due_datetime = Some(due);
        self
    }

    pub fn without_due(mut self) -> Self {
        self.task.due_datetime = None;
        self
    }

    /// Enables remind_me together with the lead-time value
    pub fn with_reminder(mut self, remind_before: RemindBefore) -> Self {
        self.task.remind_me = true;
        self.task.remind_before = Some(remind_before);
        self
    }

    pub fn without_reminder(mut self) -> Self {
        self.task.remind_me = false;
        self.task.remind_before = None;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn recurring(mut self, days: i32) -> Self {
        self.task.recurring = true;
        self.task.recurring_days = days;
        self
    }

    pub fn reminder_already_sent(mut self) -> Self {
        self.task.reminder_sent = true;
        self.task.reminder_sent_at = Some(Utc::now());
        self
    }

    pub fn deleted_by(mut self, actor_id: i64) -> Self {
        self.task.deleted_at = Some(Utc::now());
        self.task.deleted_by = Some(actor_id);
        self
    }

    pub fn with_created_by(mut self, user_id: i64) -> Self {
        self.task.created_by = user_id;
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test Pet entities
pub struct PetBuilder {
    pet: Pet,
}

impl PetBuilder {
    pub fn new() -> Self {
        Self {
            pet: Pet {
                id: 1,
                name: "Barsik".to_string(),
                owner_id: 1,
                caregiver_id: None,
                created_at: Utc::now(),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.pet.id = id;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.pet.name = name.to_string();
        self
    }

    pub fn with_owner(mut self, owner_id: i64) -> Self {
        self.pet.owner_id = owner_id;
        self
    }

    pub fn with_caregiver(mut self, caregiver_id: i64) -> Self {
        self.pet.caregiver_id = Some(caregiver_id);
        self
    }

    pub fn build(self) -> Pet {
        self.pet
    }
}

impl Default for PetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test User entities
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    pub fn new() -> Self {
        Self {
            user: User {
                id: 1,
                email: Some("user@example.com".to_string()),
                first_name: None,
                telegram_chat_id: None,
                communication_method: CommunicationMethod::Email,
                preferred_timezone: None,
                created_at: Utc::now(),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.user.id = id;
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.user.email = Some(email.to_string());
        self
    }

    pub fn without_email(mut self) -> Self {
        self.user.email = None;
        self
    }

    pub fn with_first_name(mut self, name: &str) -> Self {
        self.user.first_name = Some(name.to_string());
        self
    }

    /// Links a telegram chat and switches the preference to telegram
    pub fn with_telegram(mut self, chat_id: i64) -> Self {
        self.user.telegram_chat_id = Some(chat_id);
        self.user.communication_method = CommunicationMethod::Telegram;
        self
    }

    pub fn preferring_telegram_without_chat(mut self) -> Self {
        self.user.telegram_chat_id = None;
        self.user.communication_method = CommunicationMethod::Telegram;
        self
    }

    pub fn with_timezone(mut self, offset: &str) -> Self {
        self.user.preferred_timezone = Some(offset.to_string());
        self
    }

    pub fn build(self) -> User {
        self.user
    }
}

impl Default for UserBuilder {
    fn default() -> Self {
        Self::new()
    }
}
