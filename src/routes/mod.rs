pub mod auth;
pub mod health;
pub mod tasks;

use actix_cors::Cors;
use actix_web::{error, web};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Registers every endpoint. Mounted under `/api` behind the auth middleware.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(health::ping)
        .service(health::health)
        .service(auth::register)
        .service(auth::login)
        .service(auth::profile)
        .service(
            web::scope("/tasks")
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

/// Browser clients are served from another origin.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected JSON payload: {}", err);
        error::Error::from(AppError::BadRequest("Invalid JSON".into()))
    })
}

// Task ids are numeric; anything else cannot name a task.
fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| error::Error::from(AppError::NotFound("Task not found".into())))
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| error::Error::from(AppError::BadRequest(err.to_string())))
}

/// Parses a raw request body. Used where the body must only be read after
/// the target resource has been authorized.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|err| {
        log::debug!("Rejected JSON payload: {}", err);
        AppError::BadRequest("Invalid JSON".into())
    })
}
