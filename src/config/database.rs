use serde::Deserialize;
use std::num::{NonZeroU32, NonZeroU64};

use crate::types::validation::ValidationErrorBuilder;
use crate::util::Sensitive;

/// Configuration for connecting to the Postgres database.
#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    /// Connection URL of the Postgres database.
    ///
    /// **Environment variables**:
    /// - `DOGGO_DB_URL` or `DATABASE_URL`
    pub url: Sensitive<String>,
    /// Minimum idle database connections just to avoid wasting
    /// hardware resources from the database server.
    ///
    /// **Environment variables**:
    /// - `DOGGO_DB_MIN_IDLE`
    pub min_idle: Option<NonZeroU32>,
    /// Maximum amount of connections the pool can hold.
    ///
    /// **Environment variables**:
    /// - `DOGGO_DB_POOL_SIZE`
    #[serde(default = "Database::default_pool_size")]
    pub pool_size: NonZeroU32,
    /// Forces all database connections to be encrypted with TLS.
    ///
    /// **Environment variables**:
    /// - `DOGGO_DB_ENFORCE_TLS`
    #[serde(default = "Database::default_enforce_tls")]
    pub enforce_tls: bool,
    /// How long the server waits for a connection to be acquired
    /// before giving up.
    ///
    /// **Environment variables**:
    /// - `DOGGO_DB_TIMEOUT_SECS`
    #[serde(default = "Database::default_timeout_secs")]
    pub timeout_secs: NonZeroU64,
}

impl Database {
    const DEFAULT_POOL_SIZE: u32 = 5;
    const DEFAULT_TIMEOUT_SECS: u64 = 5;

    pub(super) fn validate(&self, errors: &mut ValidationErrorBuilder) {
        let is_postgres = url::Url::parse(self.url.as_str())
            .map(|v| matches!(v.scheme(), "postgres" | "postgresql"))
            .unwrap_or_default();

        if !is_postgres {
            errors.insert("db.url", "Invalid Postgres connection URL");
        }
    }

    // Required by serde
    const fn default_pool_size() -> NonZeroU32 {
        match NonZeroU32::new(Self::DEFAULT_POOL_SIZE) {
            Some(n) => n,
            None => panic!("DEFAULT_POOL_SIZE is accidentally set to 0"),
        }
    }

    const fn default_timeout_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_TIMEOUT_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_TIMEOUT_SECS is accidentally set to 0"),
        }
    }

    const fn default_enforce_tls() -> bool {
        true
    }
}
