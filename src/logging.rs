use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{Logging, LoggingStyle};

#[derive(Debug, Error)]
#[error("Failed to initialize tracing")]
pub struct TracingInitError;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes priority over `logging.targets` if both are set.
pub fn init(config: &Logging) -> Result<(), TracingInitError> {
    let targets = std::env::var("RUST_LOG")
        .ok()
        .or_else(|| config.targets.clone())
        .unwrap_or_default();

    let fmt_layer = fmt::layer().with_target(true);
    let fmt_layer = match config.style {
        LoggingStyle::Compact => fmt_layer.compact().boxed(),
        LoggingStyle::Full => fmt_layer.boxed(),
        LoggingStyle::Pretty => fmt_layer.pretty().boxed(),
    };

    let registry = tracing_subscriber::registry()
        .with(fmt_layer.with_filter(make_env_filter(&targets)))
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(registry)
        .change_context(TracingInitError)
        .attach_printable("already initialized tracing")?;

    if std::env::var("RUST_LOG").is_ok() && config.targets.is_some() {
        tracing::warn!("Both `RUST_LOG` and `logging.targets` are set, `RUST_LOG` is used");
    }

    Ok(())
}

/// Routes logs to the test harness output. Safe to call from every test.
pub fn init_for_tests() {
    let registry = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_test_writer()
                .with_filter(make_env_filter(&std::env::var("RUST_LOG").unwrap_or_default())),
        )
        .with(ErrorLayer::default());

    // another test might have installed it already
    tracing::subscriber::set_global_default(registry).ok();
}

fn make_env_filter(targets: &str) -> EnvFilter {
    let default_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(targets)
}
