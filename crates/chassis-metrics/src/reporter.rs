//! The reporter contract shared by both metrics backends.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;

use crate::error::Result;
use crate::store::MetricDefinition;

/// A metrics backend behind a uniform register/observe/expose contract.
///
/// Registration happens synchronously during process construction, before
/// any traffic flows, and may fail; failures are startup-fatal at the call
/// site. Observations are infallible by contract: an unknown metric name
/// or a label vector whose length differs from the registered schema is
/// dropped with an error log, never surfaced to the caller.
pub trait Reporter: Send + Sync {
    fn register_counter(&self, name: &str, description: &str, labels: &[&str]) -> Result<()>;

    fn register_gauge(&self, name: &str, description: &str, labels: &[&str]) -> Result<()>;

    /// `quantiles` maps a target quantile (0..1) to an allowed error
    /// bound. Backends without exact-quantile support ignore it and model
    /// the metric as a histogram over a fixed bucket set.
    fn register_summary(
        &self,
        name: &str,
        description: &str,
        quantiles: &[(f64, f64)],
        labels: &[&str],
    ) -> Result<()>;

    /// Empty `buckets` selects a backend-specific default boundary set.
    fn register_histogram(
        &self,
        name: &str,
        description: &str,
        buckets: &[f64],
        labels: &[&str],
    ) -> Result<()>;

    fn inc_counter(&self, name: &str, value: f64, labels: &[&str]);

    fn set_gauge(&self, name: &str, value: f64, labels: &[&str]);

    fn observe_summary(&self, name: &str, value: f64, labels: &[&str]);

    fn observe_histogram(&self, name: &str, value: f64, labels: &[&str]);

    /// Backend-specific introspection endpoints, mounted on the primary
    /// mux outside the middleware chain.
    fn routes(self: Arc<Self>) -> Router;

    /// Defensive snapshot of every registered definition.
    fn definitions(&self) -> HashMap<String, MetricDefinition>;
}
