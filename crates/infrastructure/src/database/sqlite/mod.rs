pub mod sqlite_pet_repository;
pub mod sqlite_task_repository;
pub mod sqlite_user_repository;

pub use sqlite_pet_repository::SqlitePetRepository;
pub use sqlite_task_repository::SqliteTaskRepository;
pub use sqlite_user_repository::SqliteUserRepository;
