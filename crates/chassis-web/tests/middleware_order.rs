//! Middleware composition and instrumentation tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use chassis_metrics::store::DefinitionStore;
use chassis_metrics::{MetricDefinition, MetricKind, Reporter};
use chassis_web::{Middleware, Server};

/// Records pre/post execution order under a shared log.
struct Tag {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Middleware for Tag {
    async fn handle(&self, request: Request, next: Next) -> Response {
        self.log.lock().unwrap().push(format!("{}:pre", self.name));
        let response = next.run(request).await;
        self.log.lock().unwrap().push(format!("{}:post", self.name));
        response
    }
}

#[tokio::test]
async fn first_registered_middleware_runs_outermost() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut server = Server::builder()
        .middleware(Arc::new(Tag { name: "a", log: Arc::clone(&log) }))
        .middleware(Arc::new(Tag { name: "b", log: Arc::clone(&log) }))
        .build()
        .unwrap();

    let handler_log = Arc::clone(&log);
    server
        .handle("GET /probe", move || {
            let log = Arc::clone(&handler_log);
            async move {
                log.lock().unwrap().push("handler".to_string());
                "ok"
            }
        })
        .unwrap();

    let res = server
        .into_router()
        .oneshot(Request::builder().uri("/probe").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let order = log.lock().unwrap().clone();
    assert_eq!(order, ["a:pre", "b:pre", "handler", "b:post", "a:post"]);
}

/// Test double that records every call instead of talking to a backend.
#[derive(Default)]
struct RecordingReporter {
    store: Mutex<DefinitionStore>,
    observations: Mutex<Vec<(String, Vec<String>)>>,
}

impl Reporter for RecordingReporter {
    fn register_counter(&self, name: &str, description: &str, labels: &[&str]) -> chassis_metrics::Result<()> {
        self.store.lock().unwrap().register(
            name,
            description,
            MetricKind::Counter,
            chassis_metrics::store::sanitize(labels),
        );
        Ok(())
    }

    fn register_gauge(&self, name: &str, description: &str, labels: &[&str]) -> chassis_metrics::Result<()> {
        self.store.lock().unwrap().register(
            name,
            description,
            MetricKind::Gauge,
            chassis_metrics::store::sanitize(labels),
        );
        Ok(())
    }

    fn register_summary(
        &self,
        name: &str,
        description: &str,
        _quantiles: &[(f64, f64)],
        labels: &[&str],
    ) -> chassis_metrics::Result<()> {
        self.store.lock().unwrap().register(
            name,
            description,
            MetricKind::Summary,
            chassis_metrics::store::sanitize(labels),
        );
        Ok(())
    }

    fn register_histogram(
        &self,
        name: &str,
        description: &str,
        _buckets: &[f64],
        labels: &[&str],
    ) -> chassis_metrics::Result<()> {
        self.store.lock().unwrap().register(
            name,
            description,
            MetricKind::Histogram,
            chassis_metrics::store::sanitize(labels),
        );
        Ok(())
    }

    fn inc_counter(&self, name: &str, _value: f64, labels: &[&str]) {
        self.record(name, labels);
    }

    fn set_gauge(&self, name: &str, _value: f64, labels: &[&str]) {
        self.record(name, labels);
    }

    fn observe_summary(&self, name: &str, _value: f64, labels: &[&str]) {
        self.record(name, labels);
    }

    fn observe_histogram(&self, name: &str, _value: f64, labels: &[&str]) {
        self.record(name, labels);
    }

    fn routes(self: Arc<Self>) -> Router {
        Router::new()
    }

    fn definitions(&self) -> HashMap<String, MetricDefinition> {
        self.store.lock().unwrap().snapshot()
    }
}

impl RecordingReporter {
    fn record(&self, name: &str, labels: &[&str]) {
        self.observations.lock().unwrap().push((
            name.to_string(),
            labels.iter().map(|l| l.to_string()).collect(),
        ));
    }
}

#[tokio::test]
async fn instrumentation_records_method_path_and_status() {
    let reporter = Arc::new(RecordingReporter::default());
    let mut server = Server::builder()
        .reporter(Arc::clone(&reporter) as Arc<dyn Reporter>)
        .build()
        .unwrap();
    server
        .handle("GET /probe", || async { (StatusCode::CREATED, "made") })
        .unwrap();

    let defs = reporter.definitions();
    assert!(defs.contains_key("app_request_latency_histogram"));
    assert!(defs.contains_key("app_request_latency"));

    let res = server
        .into_router()
        .oneshot(Request::builder().uri("/probe").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let observations = reporter.observations.lock().unwrap().clone();
    assert!(observations.contains(&(
        "app_request_latency_histogram".to_string(),
        vec!["GET".to_string(), "/probe".to_string()],
    )));
    assert!(observations.contains(&(
        "app_request_latency".to_string(),
        vec!["GET".to_string(), "/probe".to_string(), "201".to_string()],
    )));
}
