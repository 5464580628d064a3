//! Push-based reporter backed by the OpenTelemetry metrics API.
//!
//! Observations are handed to an exporter pipeline configured on the meter
//! provider; this reporter never exposes a scrape endpoint, only the
//! documentation page.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::Router;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use opentelemetry::{global, KeyValue};

use crate::docs;
use crate::error::Result;
use crate::reporter::Reporter;
use crate::store::{sanitize, DefinitionStore, MetricDefinition, MetricKind, DEFAULT_BUCKETS};

/// Reporter whose values are actively exported by the process.
pub struct PushReporter {
    meter: Meter,
    state: RwLock<PushState>,
}

#[derive(Default)]
struct PushState {
    store: DefinitionStore,
    counters: HashMap<String, Counter<f64>>,
    gauges: HashMap<String, Gauge<f64>>,
    summaries: HashMap<String, Histogram<f64>>,
    histograms: HashMap<String, Histogram<f64>>,
}

impl PushState {
    /// Zip the registered schema with the supplied values. Only the count
    /// is validated; positional meaning is caller discipline.
    fn attributes(&self, name: &str, labels: &[&str]) -> Option<Vec<KeyValue>> {
        match self.store.get(name) {
            Some(def) if def.label_count() == labels.len() => Some(
                def.labels()
                    .iter()
                    .zip(labels)
                    .map(|(k, v)| KeyValue::new(k.clone(), (*v).to_string()))
                    .collect(),
            ),
            Some(def) => {
                tracing::error!(
                    metric = name,
                    expected = def.label_count(),
                    got = labels.len(),
                    "observation dropped: label count mismatch"
                );
                None
            }
            None => {
                tracing::error!(metric = name, "observation dropped: metric not registered");
                None
            }
        }
    }
}

impl PushReporter {
    /// Build a reporter on the globally configured meter provider.
    pub fn new() -> Self {
        Self::with_meter(global::meter("chassis-push-reporter"))
    }

    /// Build a reporter on an explicit meter (tests inject an SDK meter
    /// here instead of touching global state).
    pub fn with_meter(meter: Meter) -> Self {
        Self {
            meter,
            state: RwLock::new(PushState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PushState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PushState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PushReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for PushReporter {
    fn register_counter(&self, name: &str, description: &str, labels: &[&str]) -> Result<()> {
        let labels = sanitize(labels);
        let counter = self
            .meter
            .f64_counter(name.to_string())
            .with_description(description.to_string())
            .build();

        let mut state = self.write();
        state.store.register(name, description, MetricKind::Counter, labels);
        state.counters.insert(name.to_string(), counter);
        Ok(())
    }

    fn register_gauge(&self, name: &str, description: &str, labels: &[&str]) -> Result<()> {
        let labels = sanitize(labels);
        let gauge = self
            .meter
            .f64_gauge(name.to_string())
            .with_description(description.to_string())
            .build();

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

        // Quantile objectives are ignored: the metric becomes a histogram
        // with the fixed global boundary set, trading exact-quantile
        // support for a backend-agnostic model.
        let histogram = self
            .meter
            .f64_histogram(name.to_string())
            .with_description(description.to_string())
            .with_boundaries(DEFAULT_BUCKETS.to_vec())
            .build();

        let mut state = self.write();
        state.store.register(name, description, MetricKind::Summary, labels);
        state.summaries.insert(name.to_string(), histogram);
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
        let buckets = if buckets.is_empty() {
            DEFAULT_BUCKETS.to_vec()
        } else {
            buckets.to_vec()
        };
        let histogram = self
            .meter
            .f64_histogram(name.to_string())
            .with_description(description.to_string())
            .with_boundaries(buckets)
            .build();

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
        if let Some(attrs) = state.attributes(name, labels) {
            counter.add(value, &attrs);
        }
    }

    fn set_gauge(&self, name: &str, value: f64, labels: &[&str]) {
        let state = self.read();
        let Some(gauge) = state.gauges.get(name) else {
            tracing::error!(metric = name, "observation dropped: gauge not registered");
            return;
        };
        if let Some(attrs) = state.attributes(name, labels) {
            gauge.record(value, &attrs);
        }
    }

    fn observe_summary(&self, name: &str, value: f64, labels: &[&str]) {
        let state = self.read();
        let Some(summary) = state.summaries.get(name) else {
            tracing::error!(metric = name, "observation dropped: summary not registered");
            return;
        };
        if let Some(attrs) = state.attributes(name, labels) {
            summary.record(value, &attrs);
        }
    }

    fn observe_histogram(&self, name: &str, value: f64, labels: &[&str]) {
        let state = self.read();
        let Some(histogram) = state.histograms.get(name) else {
            tracing::error!(metric = name, "observation dropped: histogram not registered");
            return;
        };
        if let Some(attrs) = state.attributes(name, labels) {
            histogram.record(value, &attrs);
        }
    }

    fn routes(self: Arc<Self>) -> Router {
        docs::route(self)
    }

    fn definitions(&self) -> HashMap<String, MetricDefinition> {
        self.read().store.snapshot()
    }
}
