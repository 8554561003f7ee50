use actix_web::{body::BoxBody, http::StatusCode, HttpResponse};

use super::Error;
use crate::types::Error as ErrorType;

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.error_type {
            ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorType::InvalidFormBody { .. }
            | ErrorType::InvalidCredentials
            | ErrorType::SaveFailed { .. } => StatusCode::BAD_REQUEST,
            ErrorType::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorType::Forbidden => StatusCode::FORBIDDEN,
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::Conflict { .. } => StatusCode::CONFLICT,
            ErrorType::ReadonlyMode => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(report = ?self.report, trace = %self.trace, "request failed");
        } else {
            tracing::debug!(error = %self.error_type, "rejected request");
        }

        HttpResponse::build(status).json(&self.error_type)
    }
}
