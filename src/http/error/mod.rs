use error_stack::Report;
use tracing_error::SpanTrace;

use crate::auth::AuthError;
use crate::types;

mod impls;

pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by every handler. It keeps the whole report for the
/// logs while clients only see `error_type`.
pub struct Error {
    error_type: types::Error,
    report: Report<AuthError>,
    trace: SpanTrace,
}

impl Error {
    #[must_use]
    pub fn from_report(report: Report<AuthError>) -> Self {
        let error_type = match report.current_context() {
            AuthError::Validation(errors) => types::Error::InvalidFormBody {
                errors: errors.clone(),
            },
            AuthError::InvalidCredentials => types::Error::InvalidCredentials,
            AuthError::Unauthenticated => types::Error::Unauthenticated,
            AuthError::Forbidden => types::Error::Forbidden,
            AuthError::NotFound => types::Error::NotFound,
            AuthError::Conflict(errors) => types::Error::Conflict {
                errors: errors.clone(),
            },
            AuthError::SaveFailed(message) => types::Error::SaveFailed {
                message: message.clone(),
            },
            AuthError::Readonly => types::Error::ReadonlyMode,
            AuthError::Internal => types::Error::Internal,
        };

        Self {
            error_type,
            report,
            trace: SpanTrace::capture(),
        }
    }

    #[must_use]
    pub fn from_context(context: AuthError) -> Self {
        Self::from_report(Report::new(context))
    }
}

impl Error {
    #[must_use]
    pub fn as_type(&self) -> &types::Error {
        &self.error_type
    }

    #[must_use]
    pub fn report(&self) -> &Report<AuthError> {
        &self.report
    }
}

impl From<Report<AuthError>> for Error {
    fn from(report: Report<AuthError>) -> Self {
        Self::from_report(report)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Error")
            .field("type", &self.error_type)
            .field("report", &self.report)
            .field("trace", &self.trace)
            .finish()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", &self.error_type)?;
        writeln!(f, "{:?}", self.report)?;
        std::fmt::Display::fmt(&self.trace, f)
    }
}
