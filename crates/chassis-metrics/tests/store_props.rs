//! Definition-store property tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use chassis_metrics::{MetricKind, PullReporter, Reporter};

#[test]
fn label_count_matches_schema_for_every_metric() {
    let reporter = PullReporter::new();
    reporter.register_counter("requests_total", "Total requests", &[]).unwrap();
    reporter
        .register_gauge("queue_depth", "Jobs waiting", &["queue"])
        .unwrap();
    reporter
        .register_histogram("latency", "Service response time", &[], &["method", "path"])
        .unwrap();

    for (name, def) in reporter.definitions() {
        assert_eq!(def.label_count(), def.labels().len(), "metric {name}");
    }
}

#[test]
fn labels_are_sanitized_at_registration() {
    let reporter = PullReporter::new();
    reporter
        .register_counter("hits", "Hits", &["http.method", "peer-host", "path"])
        .unwrap();

    let defs = reporter.definitions();
    let def = defs.get("hits").unwrap();
    assert_eq!(def.labels(), &["http_method", "peer_host", "path"]);
}

#[test]
fn sanitization_is_idempotent() {
    let reporter = PullReporter::new();
    reporter
        .register_counter("clean", "Already clean", &["http_method", "path"])
        .unwrap();

    let defs = reporter.definitions();
    assert_eq!(defs.get("clean").unwrap().labels(), &["http_method", "path"]);
}

#[test]
fn definitions_returns_a_defensive_copy() {
    let reporter = PullReporter::new();
    reporter.register_counter("requests_total", "Total requests", &[]).unwrap();

    let mut snapshot = reporter.definitions();
    snapshot.remove("requests_total");
    snapshot.insert(
        "forged".to_string(),
        chassis_metrics::MetricDefinition::new(MetricKind::Gauge, "forged", vec![]),
    );

    let fresh = reporter.definitions();
    assert!(fresh.contains_key("requests_total"));
    assert!(!fresh.contains_key("forged"));
}

#[test]
fn reporter_is_usable_as_a_trait_object() {
    let reporter: Arc<dyn Reporter> = Arc::new(PullReporter::new());
    reporter.register_counter("requests_total", "Total requests", &[]).unwrap();
    reporter.inc_counter("requests_total", 1.0, &[]);
    assert_eq!(reporter.definitions().len(), 1);
}
