//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `filter` when it is set and valid.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_logging(filter: &str, format: LogFormat) {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|e| {
            eprintln!("Invalid log filter {filter:?}: {e}; falling back to \"info\"");
            EnvFilter::new("info")
        });

    let registry = tracing_subscriber::registry().with(filter_layer);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).flatten_event(true))
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).init(),
    }

    tracing::info!(filter = %filter, ?format, "Logging initialized");
}

#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}
