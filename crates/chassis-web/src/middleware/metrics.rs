//! Request instrumentation middleware.
//!
//! Registers one histogram and one summary at construction time, then
//! records wall-clock latency (milliseconds) and the final status code for
//! every wrapped request. A bad instrumentation call never fails or slows
//! the request.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;

use chassis_metrics::{to_millis, Reporter, DEFAULT_BUCKETS};

use super::Middleware;
use crate::error::Result;

pub const REQUEST_LATENCY_HISTOGRAM: &str = "app_request_latency_histogram";
pub const REQUEST_LATENCY_SUMMARY: &str = "app_request_latency";

/// Captures basic response and timing information for HTTP endpoints.
pub struct HttpMetrics {
    reporter: Arc<dyn Reporter>,
}

impl HttpMetrics {
    /// Registers the request metrics exactly once; registration failure is
    /// startup-fatal at the call site.
    pub fn new(reporter: Arc<dyn Reporter>) -> Result<Self> {
        reporter.register_histogram(
            REQUEST_LATENCY_HISTOGRAM,
            "Service response time",
            &DEFAULT_BUCKETS,
            &["method", "path"],
        )?;
        reporter.register_summary(
            REQUEST_LATENCY_SUMMARY,
            "Service response time with more labels",
            &[],
            &["method", "path", "status_code"],
        )?;
        Ok(Self { reporter })
    }
}

#[async_trait]
impl Middleware for HttpMetrics {
    async fn handle(&self, request: Request, next: Next) -> Response {
        let method = request.method().to_string();
        // Label by the resolved route pattern; unmatched requests fall
        // back to the raw path.
        let path = request
            .extensions()
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());

        let start = Instant::now();
        let response = next.run(request).await;
        let elapsed = to_millis(start.elapsed());

        let status = response.status().as_u16().to_string();
        self.reporter
            .observe_histogram(REQUEST_LATENCY_HISTOGRAM, elapsed, &[&method, &path]);
        self.reporter
            .observe_summary(REQUEST_LATENCY_SUMMARY, elapsed, &[&method, &path, &status]);

        response
    }
}
