//! Error surface of the web crate.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, WebError>;

/// Errors raised while configuring or running a server.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("invalid route pattern: {0}")]
    InvalidPattern(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("bind failed: {0}")]
    Bind(std::io::Error),
    #[error("error listening and serving: {0}")]
    Serve(std::io::Error),
    #[error(transparent)]
    Metrics(#[from] chassis_metrics::MetricsError),
}
