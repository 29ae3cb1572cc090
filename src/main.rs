use std::io;

use actix_web::{web, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskboard::{
    auth::TokenSigner,
    build_app,
    config::{Config, StorageBackend},
    store::{MemoryStore, PgStore},
    AppState,
};

fn startup_error<E: std::fmt::Display>(context: &str, err: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

async fn build_state(config: &Config) -> io::Result<AppState> {
    let signer = TokenSigner::new(&config.jwt_secret, config.jwt_ttl_seconds);

    match config.storage {
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; data is lost on shutdown");
            Ok(AppState::memory(MemoryStore::new(), signer, config.bcrypt_cost))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| startup_error("Configuration error", "DATABASE_URL must be set"))?;
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .map_err(|e| startup_error("Failed to connect to database", e))?;

            let store = PgStore::new(pool);
            store
                .migrate()
                .await
                .map_err(|e| startup_error("Failed to run migrations", e))?;
            Ok(AppState::postgres(store, signer, config.bcrypt_cost))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("Configuration error", e))?;
    let state = web::Data::new(build_state(&config).await?);

    log::info!("Starting task board server at {}", config.server_url());
    HttpServer::new(move || build_app(state.clone()))
        .bind((config.server_host.as_str(), config.server_port))?
        .run()
        .await
}
