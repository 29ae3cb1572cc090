use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::store::{MemoryStore, PgStore, TaskRepository, UserRepository};

/// Shared per-application state handed to every handler via `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub tokens: TokenSigner,
    /// bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        tokens: TokenSigner,
        password_cost: u32,
    ) -> Self {
        Self {
            users,
            tasks,
            tokens,
            password_cost,
        }
    }

    pub fn postgres(store: PgStore, tokens: TokenSigner, password_cost: u32) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store, tokens, password_cost)
    }

    pub fn memory(store: MemoryStore, tokens: TokenSigner, password_cost: u32) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store, tokens, password_cost)
    }
}
