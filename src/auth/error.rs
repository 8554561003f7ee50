use error_stack::Report;
use thiserror::Error;

use crate::database::{self, ErrorExt2};
use crate::types::ValidationError;

/// Outcome of a rejected authentication or user operation.
///
/// The HTTP layer maps each variant to a status code, see
/// [`crate::http::Error`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid request: {0}")]
    Validation(ValidationError),
    /// Wrong identifier and wrong password are deliberately the same error.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing, invalid or expired token")]
    Unauthenticated,
    #[error("caller is not allowed to perform this action")]
    Forbidden,
    #[error("user not found")]
    NotFound,
    #[error("already exists: {0}")]
    Conflict(ValidationError),
    /// Storing a user failed for a reason the database layer could not
    /// classify. Holds the database's detail message when it gave one.
    #[error("{0}")]
    SaveFailed(String),
    #[error("database is in read-only mode")]
    Readonly,
    #[error("could not process request")]
    Internal,
}

pub type Result<T> = error_stack::Result<T, AuthError>;

/// Message of [`AuthError::SaveFailed`] when the database gave no detail.
pub const SAVE_FAILED_MESSAGE: &str = "Error saving user";

impl AuthError {
    /// Builds the conflict reported when `field` collides with another user.
    #[must_use]
    pub fn conflict(field: &'static str) -> Self {
        Self::Conflict(ValidationError::field(
            field,
            format!("User with same {field} already exists"),
        ))
    }
}

/// Classifies database failures, keeping the original report underneath.
pub trait IntoAuthError<T> {
    fn into_auth_error(self) -> Result<T>;

    /// Same as [`IntoAuthError::into_auth_error`] for writes of a user:
    /// unclassified failures become [`AuthError::SaveFailed`].
    fn into_save_error(self) -> Result<T>;
}

fn classify(report: &Report<database::Error>, saving: bool) -> AuthError {
    if let Some(field) = report.unique_violation() {
        AuthError::conflict(field)
    } else if report.is_readonly() {
        AuthError::Readonly
    } else if saving && matches!(report.current_context(), database::Error::Internal) {
        AuthError::SaveFailed(
            report
                .detail()
                .unwrap_or_else(|| SAVE_FAILED_MESSAGE.to_string()),
        )
    } else {
        AuthError::Internal
    }
}

impl<T> IntoAuthError<T> for database::Result<T> {
    fn into_auth_error(self) -> Result<T> {
        self.map_err(|report| {
            let context = classify(&report, false);
            report.change_context(context)
        })
    }

    fn into_save_error(self) -> Result<T> {
        self.map_err(|report| {
            let context = classify(&report, true);
            report.change_context(context)
        })
    }
}
