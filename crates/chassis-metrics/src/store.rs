//! Metric definition store.
//!
//! An in-memory registry mapping a metric name to its kind, description,
//! and ordered label schema. The store itself carries no lock; each
//! reporter guards its store and instrument maps behind one shared
//! reader/writer lock.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Default bucket boundaries for latency metrics, in milliseconds.
pub const DEFAULT_BUCKETS: [f64; 15] = [
    0.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2500.0, 5000.0, 7500.0,
    10000.0,
];

/// Convert a duration to fractional milliseconds.
pub fn to_millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Replace characters that backend instrument identifiers disallow.
/// Sanitizing an already-clean name returns it unchanged.
pub fn sanitize(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| l.replace(['.', '-'], "_")).collect()
}

/// The kind of a registered metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Summary,
    Histogram,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Summary => "summary",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of a registered metric.
///
/// `label_count` is fixed at construction and always equals the length of
/// the label schema; observation calls are checked against it.
#[derive(Debug, Clone)]
pub struct MetricDefinition {
    pub kind: MetricKind,
    pub description: String,
    labels: Vec<String>,
    label_count: usize,
}

impl MetricDefinition {
    pub fn new(kind: MetricKind, description: &str, labels: Vec<String>) -> Self {
        Self {
            kind,
            description: description.to_string(),
            label_count: labels.len(),
            labels,
        }
    }

    /// Ordered label schema; positions must match the values supplied at
    /// observation time.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label_count(&self) -> usize {
        self.label_count
    }
}

/// Name -> definition registry. Registry lifetime equals process lifetime;
/// definitions are never deleted. The last registration for a name wins in
/// memory (the pull backend additionally fails hard on duplicates).
#[derive(Debug, Default)]
pub struct DefinitionStore {
    definitions: HashMap<String, MetricDefinition>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, description: &str, kind: MetricKind, labels: Vec<String>) {
        self.definitions
            .insert(name.to_string(), MetricDefinition::new(kind, description, labels));
    }

    pub fn get(&self, name: &str) -> Option<&MetricDefinition> {
        self.definitions.get(name)
    }

    /// Defensive copy; callers cannot mutate internal state through it.
    pub fn snapshot(&self) -> HashMap<String, MetricDefinition> {
        self.definitions.clone()
    }
}
