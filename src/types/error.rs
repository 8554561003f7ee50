use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::ValidationError;

/// Error body sent back to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Error {
    Internal,
    /// The request body is missing fields or has malformed ones.
    InvalidFormBody {
        errors: ValidationError,
    },
    /// Login failed. It never tells whether the account exists.
    InvalidCredentials,
    Unauthenticated,
    Forbidden,
    NotFound,
    /// Name or email is already used by another user.
    Conflict {
        errors: ValidationError,
    },
    /// A user could not be stored. `message` is the database's detail
    /// when it gave one.
    SaveFailed {
        message: String,
    },
    ReadonlyMode,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Internal => f.write_str("Failed to perform request"),
            Error::InvalidFormBody { .. } => f.write_str("User performed request with invalid body"),
            Error::InvalidCredentials => f.write_str("Invalid credentials"),
            Error::Unauthenticated => f.write_str("Authentication required"),
            Error::Forbidden => f.write_str("User is not allowed to perform this action"),
            Error::NotFound => f.write_str("Resource not found"),
            Error::Conflict { .. } => f.write_str("Resource already exists"),
            Error::SaveFailed { message } => f.write_str(message),
            Error::ReadonlyMode => f.write_str("Attempt to write read-only database"),
        }
    }
}
