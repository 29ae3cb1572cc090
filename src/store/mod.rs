//! Persistence ports. Services depend on these traits only; `postgres` and
//! `memory` provide the adapters.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskFilter, User};
use crate::pagination::PageRequest;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Inserts a fully-formed user and returns it with its assigned id.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
    /// Stamps `updated_at` and returns the refreshed user.
    async fn touch(&self, id: i64, at: NaiveDateTime) -> Result<User, AppError>;
    /// Cheap round-trip used by the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<Task>, AppError>;
    /// Returns one page of tasks matching `filter`, newest first, together
    /// with the number of tasks matching the same filter.
    async fn list(&self, filter: &TaskFilter, page: PageRequest) -> Result<(Vec<Task>, i64), AppError>;
    async fn insert(&self, task: NewTask) -> Result<Task, AppError>;
    /// Persists the mutable fields of `task` (title, description, status,
    /// priority, due date, updated_at).
    async fn update(&self, task: &Task) -> Result<Task, AppError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
