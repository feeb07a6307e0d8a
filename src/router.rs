//! Router configuration.
//!
//! - ANY /register - Registration handler; non-POST methods get 405

use axum::{extract::DefaultBodyLimit, routing::any, Router};

use crate::config::AppConfig;
use crate::handlers::register;

/// Builds the application router.
///
/// The handler performs its own method check so that every method reaching
/// `/register` gets the same plain-text 405 body.
pub fn app(config: &AppConfig) -> Router {
    Router::new()
        .route("/register", any(register))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
}
