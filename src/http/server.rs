use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;
use actix_web::web::{self, JsonConfig};
use actix_web::HttpServer;
use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing_actix_web::TracingLogger;

use super::{controllers, util};
use crate::App;

#[derive(Debug, Error)]
#[error("Failed to start the HTTP server")]
pub struct StartServerError;

/// Headers sent with every response, the same set helmet applies.
#[must_use]
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Content-Security-Policy", "default-src 'self'"))
        .add(("Cross-Origin-Opener-Policy", "same-origin"))
        .add(("Cross-Origin-Resource-Policy", "same-origin"))
        .add(("Origin-Agent-Cluster", "?1"))
        .add(("Referrer-Policy", "no-referrer"))
        .add(("Strict-Transport-Security", "max-age=15552000; includeSubDomains"))
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-DNS-Prefetch-Control", "off"))
        .add(("X-Download-Options", "noopen"))
        .add(("X-Frame-Options", "SAMEORIGIN"))
        .add(("X-Permitted-Cross-Domain-Policies", "none"))
        .add(("X-XSS-Protection", "0"))
}

/// Shared state, JSON settings and routes of the service.
pub fn configure(app: web::Data<App>) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg| {
        cfg.app_data(app.clone())
            .app_data(JsonConfig::default().error_handler(util::handle_json_error))
            .configure(controllers::configure);
    }
}

/// Serves the API until the process receives a shutdown signal.
#[tracing::instrument(skip_all)]
pub async fn run(app: App) -> Result<(), StartServerError> {
    let address = (app.config.ip, app.config.port);
    let workers = app.config.workers();
    let data = web::Data::new(app);

    let server = HttpServer::new(move || {
        actix_web::App::new()
            .wrap(security_headers())
            .wrap(Cors::permissive())
            .wrap(TracingLogger::<util::QuieterRootSpanBuilder>::new())
            .configure(configure(data.clone()))
    })
    .workers(workers)
    .bind(address)
    .change_context(StartServerError)
    .attach_printable_lazy(|| format!("could not bind to {}:{}", address.0, address.1))?;

    tracing::info!("Listening on http://{}:{}", address.0, address.1);
    server.run().await.change_context(StartServerError)
}
