//! Diagnostic (profiling) listener.
//!
//! A secondary HTTP listener exposing runtime introspection endpoints,
//! started only when a debug port is configured. It observes the same
//! cancellation signal as the primary listener but carries no drain
//! guarantee; bind and serve errors are logged, never propagated.

use axum::extract::Path;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use tokio_util::sync::CancellationToken;

pub async fn listen_and_serve(port: String, shutdown: CancellationToken) {
    let addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind debug listener");
            return;
        }
    };
    tracing::info!(%addr, "debug listening");

    if let Err(e) = axum::serve(listener, routes())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
    {
        tracing::error!(error = %e, "error serving debug");
    }
}

pub fn routes() -> Router {
    Router::new()
        .route("/debug", get(index))
        .route("/debug/memory", get(memory))
        .route("/debug/pprof", get(pprof_index))
        .route("/debug/pprof/*profile", get(pprof_profile))
}

async fn index() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Debug</title></head>
<body>
<h1>Debug Endpoints</h1>
<ul>
<li><a href="/debug/memory">/debug/memory</a> - Memory statistics</li>
<li><a href="/debug/pprof">/debug/pprof</a> - Profiling</li>
</ul>
</body>
</html>"#,
    )
}

async fn memory() -> Json<serde_json::Value> {
    let (vsize_bytes, rss_bytes) = memory_stats();
    Json(serde_json::json!({
        "vsize_bytes": vsize_bytes,
        "rss_bytes": rss_bytes,
    }))
}

#[cfg(target_os = "linux")]
fn memory_stats() -> (u64, u64) {
    // /proc/self/statm reports pages: total program size, then resident.
    const PAGE_BYTES: u64 = 4096;
    let Ok(statm) = std::fs::read_to_string("/proc/self/statm") else {
        return (0, 0);
    };
    let mut fields = statm.split_whitespace().filter_map(|f| f.parse::<u64>().ok());
    match (fields.next(), fields.next()) {
        (Some(size), Some(resident)) => (size * PAGE_BYTES, resident * PAGE_BYTES),
        _ => (0, 0),
    }
}

#[cfg(not(target_os = "linux"))]
fn memory_stats() -> (u64, u64) {
    (0, 0)
}

async fn pprof_index() -> &'static str {
    "profiling endpoints are not built into this runtime; \
     attach an external profiler (e.g. perf) to the process instead\n"
}

async fn pprof_profile(Path(profile): Path<String>) -> String {
    format!("profile {profile:?} is not available in this runtime\n")
}
