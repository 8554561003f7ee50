use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::error::JsonPayloadError;
use actix_web::HttpRequest;
use error_stack::Report;
use tracing::Span;
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};

use super::Error;
use crate::auth::AuthError;
use crate::types::ValidationError;

/// Opens request spans at `debug` so routine traffic stays out of the
/// default `info` output. Failures are still recorded on the span.
pub struct QuieterRootSpanBuilder;

impl RootSpanBuilder for QuieterRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        tracing_actix_web::root_span!(level = tracing::Level::DEBUG, request)
    }

    fn on_request_end<B: MessageBody>(
        span: Span,
        outcome: &Result<ServiceResponse<B>, actix_web::Error>,
    ) {
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}

/// Turns malformed JSON bodies into the usual `invalid_form_body` error.
pub fn handle_json_error(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let report = Report::new(AuthError::Validation(ValidationError::field(
        "body",
        error.to_string(),
    )))
    .attach_printable(format!("{error:?}"));
    Error::from(report).into()
}
