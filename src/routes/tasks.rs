use crate::{
    auth::Caller,
    error::AppError,
    models::{
        CreateTaskRequest, DataResponse, MessageDataResponse, MessageResponse, TaskPatch, TaskQuery,
        TaskView,
    },
    pagination::Paginated,
    routes::parse_json,
    services,
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

/// Retrieves a page of the caller's tasks.
///
/// Tasks are ordered newest first.
///
/// ## Query Parameters:
/// - `page` (optional): 1-based page number, default 1.
/// - `limit` (optional): Page size, default 10, clamped to 1..=100.
/// - `status` (optional): Exact status match.
/// - `priority` (optional): Exact priority match.
///
/// ## Responses:
/// - `200 OK`: `{data: [Task], meta: {total, page, limit, pages}}`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    caller: Caller,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let page = services::tasks::list(&*state.tasks, &caller, &query_params).await?;
    Ok(HttpResponse::Ok().json(Paginated {
        data: page.data.iter().map(TaskView::from).collect::<Vec<_>>(),
        meta: page.meta,
    }))
}

/// Creates a new task owned by the caller.
///
/// ## Responses:
/// - `201 Created`: `{message, data: Task}`.
/// - `400 Bad Request`: Invalid JSON, missing `title`/`status`/`priority`,
///   an unparseable `dueDate`, or validation failures (with `details`).
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let request: CreateTaskRequest = parse_json(&body)?;
    let task = services::tasks::create(&*state.tasks, &caller, request).await?;
    Ok(HttpResponse::Created().json(MessageDataResponse::new(
        "Task created successfully",
        TaskView::from(&task),
    )))
}

/// Retrieves a single task.
///
/// ## Responses:
/// - `200 OK`: `{data: Task}`.
/// - `403 Forbidden`: The task belongs to someone else.
/// - `404 Not Found`: No task with this id.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    caller: Caller,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = services::tasks::show(&*state.tasks, &caller, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DataResponse {
        data: TaskView::from(&task),
    }))
}

/// Partially updates a task.
///
/// The task is resolved and authorized before the body is parsed, so a
/// malformed body on someone else's task still answers 403.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    caller: Caller,
    task_id: web::Path<i64>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let task = services::tasks::find_owned(&*state.tasks, &caller, task_id.into_inner()).await?;
    let patch: TaskPatch = parse_json(&body)?;
    let task = services::tasks::apply_update(&*state.tasks, task, patch).await?;

    Ok(HttpResponse::Ok().json(MessageDataResponse::new(
        "Task updated successfully",
        TaskView::from(&task),
    )))
}

#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    caller: Caller,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    services::tasks::delete(&*state.tasks, &caller, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}
