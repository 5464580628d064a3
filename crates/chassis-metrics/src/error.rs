//! Error surface of the metrics crate.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors raised while registering metrics.
///
/// These are startup-time configuration errors: a process should refuse to
/// serve traffic with a broken instrument set. Observation-time problems
/// (unknown name, label-count mismatch) are never errors; they are dropped
/// and logged so the request path stays intact.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metrics backend: {0}")]
    Backend(#[from] prometheus::Error),
}
