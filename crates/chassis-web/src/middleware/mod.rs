//! Middleware chain primitives.
//!
//! A middleware wraps a handler: pre-logic, delegate to `next`, post-logic.
//! The server composes the configured chain around each registered handler
//! in registration order, so the first-registered middleware executes
//! outermost.

pub mod logging;
pub mod metrics;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::MethodRouter;

pub use logging::HttpLogging;
pub use metrics::HttpMetrics;

/// A handler wrapper in the server's middleware chain.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, request: Request, next: Next) -> Response;
}

/// Wrap one route with one middleware layer.
pub(crate) fn wrap(route: MethodRouter, middleware: Arc<dyn Middleware>) -> MethodRouter {
    route.layer(axum::middleware::from_fn(
        move |request: Request, next: Next| {
            let middleware = Arc::clone(&middleware);
            async move { middleware.handle(request, next).await }
        },
    ))
}
