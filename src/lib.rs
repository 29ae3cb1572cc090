#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "Domain models, storage, authentication, services and HTTP routes of the"]
#![doc = "task board API, plus a typed client for it. The binary (`main.rs`) only"]
#![doc = "reads configuration and starts the server."]

pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::app::build_app;
pub use crate::error::AppError;
pub use crate::state::AppState;
