use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskFilter, User};
use crate::pagination::PageRequest;
use crate::store::{TaskRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    next_user_id: i64,
    next_task_id: i64,
}

impl Tables {
    fn username_of(&self, user_id: i64) -> Result<String, AppError> {
        self.users
            .get(&user_id)
            .map(|u| u.username.clone())
            .ok_or_else(|| AppError::DatabaseError(format!("owner {} does not exist", user_id)))
    }
}

/// In-process store implementing both repositories. Clones share the same
/// tables. Mirrors the unique indexes of the SQL schema.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn task_count(&self) -> usize {
        self.tables.read().await.tasks.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("Username already taken".into()));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already exists".into()));
        }

        tables.next_user_id += 1;
        let stored = User {
            id: tables.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            roles: user.roles,
            created_at: user.created_at,
            updated_at: None,
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn touch(&self, id: i64, at: NaiveDateTime) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.updated_at = Some(at);
        Ok(user.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn find(&self, id: i64) -> Result<Option<Task>, AppError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn list(&self, filter: &TaskFilter, page: PageRequest) -> Result<(Vec<Task>, i64), AppError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Task> = tables.tasks.values().filter(|t| filter.matches(t)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(0);
        let tasks = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok((tasks, total))
    }

    async fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        let owner_username = tables.username_of(task.owner_id)?;

        tables.next_task_id += 1;
        let stored = Task {
            id: tables.next_task_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_at: task.created_at,
            updated_at: None,
            owner_id: task.owner_id,
            owner_username,
        };
        tables.tasks.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, task: &Task) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.status = task.status.clone();
        stored.priority = task.priority;
        stored.due_date = task.due_date;
        stored.updated_at = task.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }
}
