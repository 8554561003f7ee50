use error_stack::{Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;

use crate::auth::jwt::JwtKeys;
use crate::config;
use crate::database::{self, PgStore, Store};

/// Everything a request handler needs, created once at startup and
/// shared between workers.
#[derive(Debug, Clone)]
pub struct App {
    pub config: Arc<config::Server>,
    pub store: Arc<dyn Store>,
    pub jwt: Arc<JwtKeys>,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
    /// Connects to Postgres and applies pending migrations.
    #[tracing::instrument(skip_all)]
    pub async fn new(cfg: config::Server) -> Result<Self, AppError> {
        let pool = database::Pool::new(&cfg.db)
            .await
            .change_context(AppError)?;

        pool.migrate().await.change_context(AppError)?;
        Ok(Self::with_store(cfg, PgStore::new(pool)))
    }

    #[must_use]
    pub fn with_store(cfg: config::Server, store: impl Store) -> Self {
        Self {
            jwt: Arc::new(JwtKeys::new(&cfg.auth)),
            config: Arc::new(cfg),
            store: Arc::new(store),
        }
    }

    /// In-memory app with test configuration.
    #[must_use]
    pub fn for_tests() -> Self {
        Self::with_store(config::Server::for_tests(), database::MemoryStore::new())
    }
}
