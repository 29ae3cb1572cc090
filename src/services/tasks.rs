//! Owner-scoped task operations. Every function takes the caller explicitly.

use crate::auth::Caller;
use crate::error::AppError;
use crate::models::{datetime, CreateTaskRequest, NewTask, Task, TaskDraft, TaskFilter, TaskPatch, TaskQuery};
use crate::pagination::{PageMeta, PageRequest, Paginated};
use crate::store::TaskRepository;

const INVALID_DUE_DATE: &str =
    "Invalid dueDate format. Use ISO 8601 format (e.g., 2024-12-31T23:59:59)";

fn parse_due_date(raw: &str) -> Result<chrono::NaiveDateTime, AppError> {
    datetime::parse(raw).ok_or_else(|| AppError::BadRequest(INVALID_DUE_DATE.into()))
}

/// Lists the caller's tasks, newest first.
pub async fn list(
    tasks: &dyn TaskRepository,
    caller: &Caller,
    query: &TaskQuery,
) -> Result<Paginated<Task>, AppError> {
    let page = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref());
    let filter = TaskFilter::new(caller.id, query.status.as_deref(), query.priority.as_deref());

    let (data, total) = tasks.list(&filter, page).await?;
    Ok(Paginated {
        data,
        meta: PageMeta::new(page, total),
    })
}

/// Loads a task the caller owns.
///
/// A missing task is 404 and someone else's task is 403, in that order.
pub async fn find_owned(tasks: &dyn TaskRepository, caller: &Caller, id: i64) -> Result<Task, AppError> {
    let task = tasks
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if !task.is_owned_by(caller.id) {
        log::warn!("User {} denied access to task {}", caller.id, id);
        return Err(AppError::access_denied());
    }
    Ok(task)
}

pub async fn show(tasks: &dyn TaskRepository, caller: &Caller, id: i64) -> Result<Task, AppError> {
    find_owned(tasks, caller, id).await
}

/// Creates a task owned by the caller. Nothing is written unless every
/// check passes.
pub async fn create(
    tasks: &dyn TaskRepository,
    caller: &Caller,
    request: CreateTaskRequest,
) -> Result<Task, AppError> {
    let (Some(title), Some(status), Some(priority)) = (request.title, request.status, request.priority)
    else {
        return Err(AppError::BadRequest(
            "Missing required fields: title, status, priority".into(),
        ));
    };

    let due_date = match request.due_date.as_deref() {
        Some(raw) if !raw.is_empty() => Some(parse_due_date(raw)?),
        _ => None,
    };

    let draft = TaskDraft {
        title,
        description: request.description,
        status,
        priority,
        due_date,
    };
    let priority = draft.checked()?;

    let task = tasks
        .insert(NewTask {
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority,
            due_date: draft.due_date,
            created_at: datetime::now(),
            owner_id: caller.id,
        })
        .await?;

    log::info!("User {} created task {}", caller.id, task.id);
    Ok(task)
}

/// Applies a partial update to a task already known to belong to the caller.
///
/// Absent fields are kept, `dueDate: null` clears the due date, and
/// `updated_at` is stamped on every successful call.
pub async fn apply_update(tasks: &dyn TaskRepository, mut task: Task, patch: TaskPatch) -> Result<Task, AppError> {
    let mut draft = TaskDraft::from(&task);
    if let Some(title) = patch.title {
        draft.title = title;
    }
    if let Some(description) = patch.description {
        draft.description = Some(description);
    }
    if let Some(status) = patch.status {
        draft.status = status;
    }
    if let Some(priority) = patch.priority {
        draft.priority = priority;
    }
    match patch.due_date {
        Some(Some(raw)) if !raw.is_empty() => draft.due_date = Some(parse_due_date(&raw)?),
        Some(_) => draft.due_date = None,
        None => {}
    }

    let priority = draft.checked()?;
    task.title = draft.title;
    task.description = draft.description;
    task.status = draft.status;
    task.priority = priority;
    task.due_date = draft.due_date;
    task.updated_at = Some(datetime::now());

    let updated = tasks.update(&task).await?;
    log::info!("Task {} updated", updated.id);
    Ok(updated)
}

pub async fn update(
    tasks: &dyn TaskRepository,
    caller: &Caller,
    id: i64,
    patch: TaskPatch,
) -> Result<Task, AppError> {
    let task = find_owned(tasks, caller, id).await?;
    apply_update(tasks, task, patch).await
}

pub async fn delete(tasks: &dyn TaskRepository, caller: &Caller, id: i64) -> Result<(), AppError> {
    let task = find_owned(tasks, caller, id).await?;
    if !tasks.delete(task.id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }
    log::info!("User {} deleted task {}", caller.id, id);
    Ok(())
}
