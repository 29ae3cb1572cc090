use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::models::datetime;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => {
                let mut error = ValidationError::new("choice");
                error.message = Some("The value you selected is not a valid choice.".into());
                Err(error)
            }
        }
    }
}

/// Summary of the user a task belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: i64,
    pub username: String,
}

/// A task as loaded from the store, with its owner resolved.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub owner_id: i64,
    pub owner_username: String,
}

impl Task {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }

    pub fn owner(&self) -> Owner {
        Owner {
            id: self.owner_id,
            username: self.owner_username.clone(),
        }
    }
}

/// The mutable fields of a task, validated before anything is written.
/// Both creation and update funnel through this type.
#[derive(Debug, Clone, Validate)]
pub struct TaskDraft {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters."))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description cannot exceed 5000 characters."))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Status must be between 1 and 50 characters."))]
    pub status: String,

    #[validate(custom = "validate_priority")]
    pub priority: String,

    pub due_date: Option<NaiveDateTime>,
}

fn validate_priority(priority: &str) -> Result<(), ValidationError> {
    priority.parse::<TaskPriority>().map(|_| ())
}

impl TaskDraft {
    /// Runs entity validation and resolves the priority.
    pub fn checked(&self) -> Result<TaskPriority, validator::ValidationErrors> {
        self.validate()?;
        let priority = self.priority.parse::<TaskPriority>().map_err(|error| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("priority", error);
            errors
        })?;
        Ok(priority)
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.clone(),
            priority: task.priority.as_str().to_string(),
            due_date: task.due_date,
        }
    }
}

/// A validated task ready to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub owner_id: i64,
}

/// Request body for creating a task. Every field is optional at the type
/// level so missing fields can be reported together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Request body for a partial update. `due_date` distinguishes an absent key
/// (`None`) from an explicit `null` (`Some(None)`), which clears the date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<String>>,
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query parameters of the task list. Page and limit stay raw strings here;
/// [`crate::pagination::PageRequest`] clamps them instead of rejecting them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// Owner-scoped filter shared by the count and page queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub owner_id: i64,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl TaskFilter {
    /// Empty filter values are treated as absent.
    pub fn new(owner_id: i64, status: Option<&str>, priority: Option<&str>) -> Self {
        let non_empty = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);
        Self {
            owner_id,
            status: non_empty(status),
            priority: non_empty(priority),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        task.owner_id == self.owner_id
            && self.status.as_deref().map_or(true, |s| task.status == s)
            && self
                .priority
                .as_deref()
                .map_or(true, |p| task.priority.as_str() == p)
    }
}

/// Wire projection of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: TaskPriority,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub owner: Owner,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.clone(),
            priority: task.priority,
            due_date: datetime::format_opt(task.due_date.as_ref()),
            created_at: datetime::format(&task.created_at),
            updated_at: datetime::format_opt(task.updated_at.as_ref()),
            owner: task.owner(),
        }
    }
}
