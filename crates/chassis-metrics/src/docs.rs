//! Human-readable documentation page for registered metrics.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::reporter::Reporter;
use crate::store::MetricDefinition;

/// Render every registered metric as a table row, sorted by name.
pub fn render(definitions: &HashMap<String, MetricDefinition>) -> String {
    let mut rows: Vec<(&String, &MetricDefinition)> = definitions.iter().collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::from("# Service metrics\n");
    out.push_str("| Metric | Description | Type | Labels |\n");
    out.push_str("|--------|-------------|------|--------|\n");
    for (name, def) in rows {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            name,
            def.description,
            def.kind,
            def.labels().join(", ")
        );
    }
    out
}

/// `GET /metrics/docs`, rendered from a snapshot taken at request time.
pub(crate) fn route(reporter: Arc<dyn Reporter>) -> Router {
    Router::new().route(
        "/metrics/docs",
        get(move || async move { render(&reporter.definitions()) }),
    )
}
