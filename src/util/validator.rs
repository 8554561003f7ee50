use error_stack::Report;
use thiserror::Error;

use crate::types::validation::ValidationError;

#[derive(Debug, Error)]
#[error("Invalid given data occurred")]
pub struct Wrapper;

/// Turns field-level validation failures into an error-stack report where
/// every message is attached as `field: message`.
pub trait IntoValidatorReport<T> {
    fn into_validator_report(self) -> error_stack::Result<T, Wrapper>;
}

impl<T> IntoValidatorReport<T> for Result<T, ValidationError> {
    fn into_validator_report(self) -> error_stack::Result<T, Wrapper> {
        self.map_err(|error| {
            let mut report = Report::new(Wrapper);
            for (field, message) in error.iter() {
                report = report.attach_printable(format!("{field}: {message}"));
            }
            report
        })
    }
}
