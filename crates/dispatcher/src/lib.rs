pub mod caretaker;
pub mod controller;
pub mod notifier;
pub mod sweep;

pub use caretaker::CaretakerNotifier;
pub use controller::{CreateTaskRequest, TaskController};
pub use notifier::{format_due_datetime, NotificationDispatcher};
pub use sweep::{ReminderSweep, SweepOutcome};
