use thiserror::Error;

mod auth;
mod database;
mod logging;
mod server;

pub use auth::Auth;
pub use database::Database;
pub use logging::{Logging, LoggingStyle};
pub use server::Server;

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ParseError;
