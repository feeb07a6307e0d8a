pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod router;
pub mod schemas;

pub use router::app;
