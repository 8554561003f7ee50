use error_stack::Report;
use thiserror::Error;

/// Database related errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// An error caused by an invalid Postgres connection url.
    #[error("invalid connection url")]
    InvalidUrl,
    /// Anything the store could not classify. The underlying
    /// [`sqlx`] error is kept in the report.
    #[error("received a database error")]
    Internal,
    /// Pending migrations could not be applied.
    #[error("could not run database migrations")]
    Migration,
    /// The database is currently in read mode (most likely due to
    /// maintenance) and should not perform any writes.
    #[error("database is currently in read mode")]
    Readonly,
    /// A unique constraint was violated. It holds the name of the
    /// field that collided (`name`, `email` or `value`).
    #[error("{0} is already taken")]
    UniqueViolation(&'static str),
    /// The pool does not have a reliable connection to the database.
    #[error("unhealthy database pool")]
    UnhealthyPool,
}

/// Lazily typed [`std::result::Result`] but the error generic
/// is filled up with [a database error](Error).
pub type Result<T> = error_stack::Result<T, Error>;

/// Converts from a generic [sqlx] result into a [database compatible error](Error).
pub trait ErrorExt<T> {
    fn into_db_error(self) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn into_db_error(self) -> Result<T> {
        self.map_err(|e| {
            let context = classify(&e);
            Report::new(e).change_context(context)
        })
    }
}

fn classify(error: &sqlx::Error) -> Error {
    let sqlx::Error::Database(db_error) = error else {
        return match error {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Error::UnhealthyPool,
            _ => Error::Internal,
        };
    };

    if db_error.message().ends_with("read-only transaction") {
        return Error::Readonly;
    }

    if db_error.is_unique_violation() {
        return match db_error.constraint() {
            Some("users_name_key") => Error::UniqueViolation("name"),
            Some("users_email_key") => Error::UniqueViolation("email"),
            Some("roles_value_key") => Error::UniqueViolation("value"),
            _ => Error::Internal,
        };
    }

    Error::Internal
}

/// Saves matching on `Report::current_context` at every call site.
pub trait ErrorExt2 {
    fn is_unhealthy(&self) -> bool;
    fn is_readonly(&self) -> bool;
    fn unique_violation(&self) -> Option<&'static str>;

    /// The `DETAIL` line Postgres sent with the error, if any.
    fn detail(&self) -> Option<String>;
}

impl ErrorExt2 for Report<Error> {
    fn is_unhealthy(&self) -> bool {
        matches!(self.current_context(), Error::UnhealthyPool)
    }

    fn is_readonly(&self) -> bool {
        matches!(self.current_context(), Error::Readonly)
    }

    fn unique_violation(&self) -> Option<&'static str> {
        match self.current_context() {
            Error::UniqueViolation(field) => Some(field),
            _ => None,
        }
    }

    fn detail(&self) -> Option<String> {
        let sqlx::Error::Database(error) = self.downcast_ref::<sqlx::Error>()? else {
            return None;
        };
        error
            .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
            .and_then(|v| v.detail())
            .map(str::to_string)
    }
}
