use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskFilter, User};
use crate::pagination::PageRequest;
use crate::store::{TaskRepository, UserRepository};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, roles, created_at, updated_at";

const TASK_SELECT: &str = "SELECT t.id, t.title, t.description, t.status, t.priority, t.due_date, \
     t.created_at, t.updated_at, t.owner_id, u.username AS owner_username \
     FROM tasks t JOIN users u ON u.id = t.owner_id";

/// Repositories backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn find_user_where(&self, column: &str, value: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn fetch_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        let sql = format!("{} WHERE t.id = $1", TASK_SELECT);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }
}

/// SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// A registration that lost a race past the existence lookups still
/// reports a conflict.
fn user_insert_error(error: sqlx::Error) -> AppError {
    let conflict = error
        .as_database_error()
        .filter(|db| db.code().as_deref() == Some(UNIQUE_VIOLATION))
        .map(|db| unique_conflict(db.constraint()));
    conflict.unwrap_or_else(|| AppError::from(error))
}

// Constraint names are Postgres defaults: users_username_key, users_email_key.
fn unique_conflict(constraint: Option<&str>) -> AppError {
    if constraint.is_some_and(|name| name.contains("email")) {
        AppError::Conflict("Email already exists".into())
    } else {
        AppError::Conflict("Username already taken".into())
    }
}

/// Appends the owner/status/priority predicate. The count and the page
/// query both go through here so they always agree on what matches.
fn push_task_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
    builder.push(" WHERE t.owner_id = ").push_bind(filter.owner_id);
    if let Some(status) = &filter.status {
        builder.push(" AND t.status = ").push_bind(status.clone());
    }
    if let Some(priority) = &filter.priority {
        builder
            .push(" AND t.priority::text = ")
            .push_bind(priority.clone());
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.find_user_where("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_user_where("email", email).await
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, first_name, last_name, roles, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            USER_COLUMNS
        );
        let inserted = sqlx::query_as::<_, User>(&sql)
            .bind(user.username)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.roles)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(user_insert_error)?;
        Ok(inserted)
    }

    async fn touch(&self, id: i64, at: NaiveDateTime) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET updated_at = $2 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;
        user.ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn find(&self, id: i64) -> Result<Option<Task>, AppError> {
        self.fetch_task(id).await
    }

    async fn list(&self, filter: &TaskFilter, page: PageRequest) -> Result<(Vec<Task>, i64), AppError> {
        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(t.id) FROM tasks t JOIN users u ON u.id = t.owner_id");
        push_task_filter(&mut count_query, filter);
        let (total,): (i64,) = count_query.build_query_as().fetch_one(&self.pool).await?;

        let mut page_query = QueryBuilder::<Postgres>::new(TASK_SELECT);
        push_task_filter(&mut page_query, filter);
        page_query
            .push(" ORDER BY t.created_at DESC, t.id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let tasks = page_query
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await?;

        Ok((tasks, total))
    }

    async fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO tasks (title, description, status, priority, due_date, created_at, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(task.title)
        .bind(task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.owner_id)
        .fetch_one(&self.pool)
        .await?;

        self.fetch_task(id)
            .await?
            .ok_or_else(|| AppError::InternalServerError(format!("Task {} vanished after insert", id)))
    }

    async fn update(&self, task: &Task) -> Result<Task, AppError> {
        let result = sqlx::query(
            "UPDATE tasks SET title = $2, description = $3, status = $4, priority = $5, \
             due_date = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Task not found".into()));
        }

        self.fetch_task(task.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violations_become_conflicts() {
        assert_eq!(
            unique_conflict(Some("users_username_key")),
            AppError::Conflict("Username already taken".into())
        );
        assert_eq!(
            unique_conflict(Some("users_email_key")),
            AppError::Conflict("Email already exists".into())
        );
        assert_eq!(
            user_insert_error(sqlx::Error::RowNotFound),
            AppError::DatabaseError(sqlx::Error::RowNotFound.to_string())
        );
    }

    #[test]
    fn test_filter_sql_shape() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(t.id) FROM tasks t");
        push_task_filter(
            &mut builder,
            &TaskFilter::new(1, Some("todo"), Some("high")),
        );
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(t.id) FROM tasks t WHERE t.owner_id = $1 AND t.status = $2 AND t.priority::text = $3"
        );

        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(t.id) FROM tasks t");
        push_task_filter(&mut builder, &TaskFilter::new(1, None, Some("low")));
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(t.id) FROM tasks t WHERE t.owner_id = $1 AND t.priority::text = $2"
        );
    }
}
