//! Testing utilities for the petcare workspace
//!
//! In-memory mock implementations of the repository and channel traits,
//! plus builders for test entities. No database or network required.

pub mod builders;
pub mod mocks;

pub use builders::{PetBuilder, TaskBuilder, UserBuilder};
pub use mocks::{
    MockNotificationChannel, MockPetRepository, MockTaskRepository, MockUserRepository,
    RecordedNotification,
};
