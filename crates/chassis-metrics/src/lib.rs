//! chassis-metrics: a pluggable metrics-reporting abstraction.
//!
//! This crate defines the [`Reporter`] capability set shared by the server
//! and middleware, together with two concrete backends: [`PullReporter`]
//! (scraped on demand over `GET /metrics`) and [`PushReporter`] (actively
//! exported through an OpenTelemetry pipeline). Both backends validate
//! label cardinality at observation time and expose the same registration
//! contract, so callers never depend on a concrete backend.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Registration errors surface as [`MetricsError`]; observation errors are
//! dropped with an error log so instrumentation can never fail a request.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod docs;
pub mod error;
pub mod pull;
pub mod push;
pub mod reporter;
pub mod store;

pub use error::{MetricsError, Result};
pub use pull::PullReporter;
pub use push::PushReporter;
pub use reporter::Reporter;
pub use store::{to_millis, MetricDefinition, MetricKind, DEFAULT_BUCKETS};
