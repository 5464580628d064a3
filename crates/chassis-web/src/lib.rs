//! chassis-web: HTTP server wrapper with graceful shutdown and an ordered
//! middleware chain.
//!
//! The [`Server`] owns a request multiplexer, composes registered
//! [`Middleware`] around every handler (first registered runs outermost),
//! mounts the routes of an optional metrics [`Reporter`], and serves until
//! a cancellation token fires, after which in-flight requests get a
//! bounded grace period to drain. A secondary diagnostic listener can be
//! enabled on a separate port; it carries no drain guarantee.
//!
//! [`Reporter`]: chassis_metrics::Reporter

pub mod error;
pub mod middleware;
pub mod ops;
pub mod profile;
pub mod server;

pub use error::{Result, WebError};
pub use middleware::{HttpLogging, HttpMetrics, Middleware};
pub use server::{Server, ServerBuilder, SHUTDOWN_GRACE};
