//! Request/response logging middleware.
//!
//! Dumps the full request and the captured response at debug level. Bodies
//! are buffered and re-attached, so the client receives the response
//! unmodified. JSON bodies are pretty-printed when the content type says
//! so. Dump failures are logged and never abort the request.

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use super::Middleware;

/// Logs the full request and response of every wrapped handler.
#[derive(Default)]
pub struct HttpLogging;

impl HttpLogging {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for HttpLogging {
    async fn handle(&self, request: Request, next: Next) -> Response {
        let request = log_request(request).await;
        let response = next.run(request).await;
        log_response(response).await
    }
}

async fn log_request(request: Request) -> Request {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "failed to dump request");
            return Request::from_parts(parts, Body::empty());
        }
    };

    tracing::debug!(
        method = %parts.method,
        uri = %parts.uri,
        headers = %format_headers(&parts.headers),
        body = %render_body(&parts.headers, &bytes),
        "http request"
    );

    Request::from_parts(parts, Body::from(bytes))
}

async fn log_response(response: Response) -> Response {
    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "failed to dump response");
            return Response::from_parts(parts, Body::empty());
        }
    };

    tracing::debug!(
        status = parts.status.as_u16(),
        body = %render_body(&parts.headers, &bytes),
        "http response"
    );

    Response::from_parts(parts, Body::from(bytes))
}

fn render_body(headers: &HeaderMap, bytes: &[u8]) -> String {
    if is_json(headers) {
        if let Some(indented) = pretty_json(bytes) {
            return indented;
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn pretty_json(bytes: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

fn format_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value.to_str().unwrap_or("<binary>")))
        .collect::<Vec<_>>()
        .join("\n")
}
