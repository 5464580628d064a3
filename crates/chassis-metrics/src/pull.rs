//! Pull-based reporter backed by the `prometheus` crate.
//!
//! Values are scraped on demand via `GET /metrics`. The reporter owns its
//! own `prometheus::Registry` instance rather than the process-global
//! default, so multiple independent reporters can coexist in one test
//! process.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

use crate::docs;
use crate::error::Result;
use crate::reporter::Reporter;
use crate::store::{sanitize, DefinitionStore, MetricDefinition, MetricKind, DEFAULT_BUCKETS};

/// Reporter whose values are scraped on demand.
///
/// Duplicate registration under the same name is an irrecoverable
/// configuration error surfaced at startup: the underlying registry
/// forbids it.
pub struct PullReporter {
    registry: Registry,
    state: RwLock<PullState>,
}

#[derive(Default)]
struct PullState {
    store: DefinitionStore,
    counters: HashMap<String, CounterVec>,
    gauges: HashMap<String, GaugeVec>,
    summaries: HashMap<String, HistogramVec>,
    histograms: HashMap<String, HistogramVec>,
}

impl PullState {
    fn labels_match(&self, name: &str, labels: &[&str]) -> bool {
        match self.store.get(name).map(MetricDefinition::label_count) {
            Some(expected) if expected == labels.len() => true,
            Some(expected) => {
                tracing::error!(
                    metric = name,
                    expected,
                    got = labels.len(),
                    "observation dropped: label count mismatch"
                );
                false
            }
            None => {
                tracing::error!(metric = name, "observation dropped: metric not registered");
                false
            }
        }
    }
}

impl PullReporter {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            state: RwLock::new(PullState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PullState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PullState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn scrape(&self) -> Response {
        let families = self.registry.gather();
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&families, &mut buf) {
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
        match String::from_utf8(buf) {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }
}

impl Default for PullReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for PullReporter {
    fn register_counter(&self, name: &str, description: &str, labels: &[&str]) -> Result<()> {
        let labels = sanitize(labels);
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();

        let counter = CounterVec::new(Opts::new(name, description), &refs)?;
        self.registry.register(Box::new(counter.clone()))?;

        let mut state = self.write();
        state.store.register(name, description, MetricKind::Counter, labels);
        state.counters.insert(name.to_string(), counter);
        Ok(())
    }

    fn register_gauge(&self, name: &str, description: &str, labels: &[&str]) -> Result<()> {
        let labels = sanitize(labels);
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();

        let gauge = GaugeVec::new(Opts::new(name, description), &refs)?;
        self.registry.register(Box::new(gauge.clone()))?;

        let mut state = self.write();
        state.store.register(name, description, MetricKind::Gauge, labels);
        state.gauges.insert(name.to_string(), gauge);
        Ok(())
    }

    fn register_summary(
        &self,
        name: &str,
        description: &str,
        _quantiles: &[(f64, f64)],
        labels: &[&str],
    ) -> Result<()> {
        let labels = sanitize(labels);
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();

        // The prometheus crate implements no quantile summary; summaries
        // are modelled as histograms over the default bucket set. The
        // definition store still reports the summary kind.
        let opts = HistogramOpts::new(name, description).buckets(DEFAULT_BUCKETS.to_vec());
        let summary = HistogramVec::new(opts, &refs)?;
        self.registry.register(Box::new(summary.clone()))?;

        let mut state = self.write();
        state.store.register(name, description, MetricKind::Summary, labels);
        state.summaries.insert(name.to_string(), summary);
        Ok(())
    }

    fn register_histogram(
        &self,
        name: &str,
        description: &str,
        buckets: &[f64],
        labels: &[&str],
    ) -> Result<()> {
        let labels = sanitize(labels);
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();

        let buckets = if buckets.is_empty() {
            prometheus::DEFAULT_BUCKETS.to_vec()
        } else {
            buckets.to_vec()
        };
        let histogram = HistogramVec::new(HistogramOpts::new(name, description).buckets(buckets), &refs)?;
        self.registry.register(Box::new(histogram.clone()))?;

        let mut state = self.write();
        state.store.register(name, description, MetricKind::Histogram, labels);
        state.histograms.insert(name.to_string(), histogram);
        Ok(())
    }

    fn inc_counter(&self, name: &str, value: f64, labels: &[&str]) {
        let state = self.read();
        let Some(counter) = state.counters.get(name) else {
            tracing::error!(metric = name, "observation dropped: counter not registered");
            return;
        };
        if state.labels_match(name, labels) {
            counter.with_label_values(labels).inc_by(value);
        }
    }

    fn set_gauge(&self, name: &str, value: f64, labels: &[&str]) {
        let state = self.read();
        let Some(gauge) = state.gauges.get(name) else {
            tracing::error!(metric = name, "observation dropped: gauge not registered");
            return;
        };
        if state.labels_match(name, labels) {
            gauge.with_label_values(labels).set(value);
        }
    }

    fn observe_summary(&self, name: &str, value: f64, labels: &[&str]) {
        let state = self.read();
        let Some(summary) = state.summaries.get(name) else {
            tracing::error!(metric = name, "observation dropped: summary not registered");
            return;
        };
        if state.labels_match(name, labels) {
            summary.with_label_values(labels).observe(value);
        }
    }

    fn observe_histogram(&self, name: &str, value: f64, labels: &[&str]) {
        let state = self.read();
        let Some(histogram) = state.histograms.get(name) else {
            tracing::error!(metric = name, "observation dropped: histogram not registered");
            return;
        };
        if state.labels_match(name, labels) {
            histogram.with_label_values(labels).observe(value);
        }
    }

    fn routes(self: Arc<Self>) -> Router {
        let scrape = {
            let this = Arc::clone(&self);
            move || async move { this.scrape() }
        };
        Router::new()
            .route("/metrics", get(scrape))
            .merge(docs::route(self))
    }

    fn definitions(&self) -> HashMap<String, MetricDefinition> {
        self.read().store.snapshot()
    }
}
