//! Server lifecycle: builder, route registration, bounded graceful
//! shutdown.
//!
//! States: Configured (builder) -> Running (`start`) -> ShuttingDown
//! (cancellation observed, draining under a deadline) -> Stopped (`start`
//! returns). Routes and middleware are immutable once `start` is called.

use std::future::IntoFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::handler::Handler;
use axum::http::Method;
use axum::routing::{any, on, MethodFilter, MethodRouter};
use axum::Router;
use tokio_util::sync::CancellationToken;

use chassis_metrics::Reporter;

use crate::error::{Result, WebError};
use crate::middleware::{wrap, HttpMetrics, Middleware};
use crate::{ops, profile};

/// Grace period granted to in-flight requests once shutdown begins.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

const DEFAULT_PORT: &str = "8080";

/// A web server: request multiplexer, ordered middleware chain, primary
/// listener, optional diagnostic listener.
pub struct Server {
    port: String,
    debug_port: Option<String>,
    router: Router,
    middleware: Vec<Arc<dyn Middleware>>,
    draining: Arc<AtomicBool>,
}

/// Configuration applied before a [`Server`] exists.
///
/// Builder methods mutate configuration only; `build` runs the ordered
/// apply phase (validation, reporter route mounting, instrumentation
/// middleware, operational routes) and yields the immutable server.
pub struct ServerBuilder {
    port: String,
    debug_port: Option<String>,
    middleware: Vec<Arc<dyn Middleware>>,
    reporter: Option<Arc<dyn Reporter>>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder {
            port: DEFAULT_PORT.to_string(),
            debug_port: None,
            middleware: Vec::new(),
            reporter: None,
        }
    }

    /// Mount a handler under a `"METHOD /path"` pattern (bare `"/path"`
    /// matches any method), wrapped in the configured middleware chain.
    /// Must be called before [`Server::start`].
    pub fn handle<H, T>(&mut self, pattern: &str, handler: H) -> Result<()>
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        let (filter, path) = parse_pattern(pattern)?;
        let route = match filter {
            Some(filter) => on(filter, handler),
            None => any(handler),
        };
        let route = self.compose(route);
        self.router = std::mem::take(&mut self.router).route(path, route);
        Ok(())
    }

    /// Mount the catch-all handler for unmatched paths, wrapped in the
    /// configured middleware chain.
    pub fn fallback<H, T>(&mut self, handler: H)
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        let route = self.compose(any(handler));
        self.router = std::mem::take(&mut self.router).fallback_service(route);
    }

    // Layers wrap inside-out, so iterate the chain in reverse to keep the
    // first-registered middleware outermost.
    fn compose(&self, mut route: MethodRouter) -> MethodRouter {
        for middleware in self.middleware.iter().rev() {
            route = wrap(route, Arc::clone(middleware));
        }
        route
    }

    /// The composed router, for embedding or driving requests in tests.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve until `shutdown` is cancelled, then stop accepting
    /// connections and drain in-flight requests for up to
    /// [`SHUTDOWN_GRACE`]. Blocks until shutdown completes.
    pub async fn start(self, shutdown: CancellationToken) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(WebError::Bind)?;
        tracing::info!(%addr, "listening");

        if let Some(port) = self.debug_port {
            // Best-effort diagnostics: independent task, no drain deadline.
            tokio::spawn(profile::listen_and_serve(port, shutdown.clone()));
        }

        let draining = Arc::clone(&self.draining);
        let drain_signal = {
            let shutdown = shutdown.clone();
            async move {
                shutdown.cancelled().await;
                draining.store(true, Ordering::Relaxed);
                tracing::info!("shutdown signal received, draining in-flight requests");
            }
        };

        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(drain_signal)
            .into_future();

        let deadline = async {
            shutdown.cancelled().await;
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        };

        tokio::select! {
            result = serve => match result {
                Ok(()) => Ok(()),
                Err(e) => {
                    tracing::error!(error = %e, "error listening and serving");
                    Err(WebError::Serve(e))
                }
            },
            () = deadline => {
                tracing::error!("shutdown grace period elapsed with connections still open");
                Ok(())
            }
        }
    }
}

impl ServerBuilder {
    /// Primary listening port. Default "8080".
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    /// Diagnostic listener port. Empty disables it (the default).
    pub fn debug_port(mut self, port: impl Into<String>) -> Self {
        let port = port.into();
        self.debug_port = if port.is_empty() { None } else { Some(port) };
        self
    }

    /// Append a middleware; the chain applies outermost-first in the
    /// order given.
    pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Attach a metrics reporter: its routes are mounted on the mux
    /// (outside the middleware chain) and the request instrumentation
    /// middleware is appended to the chain.
    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<Server> {
        validate_port(&self.port)?;
        if let Some(port) = &self.debug_port {
            validate_port(port)?;
        }

        let draining = Arc::new(AtomicBool::new(false));
        let mut router = Router::new().merge(ops::routes(Arc::clone(&draining)));
        let mut middleware = self.middleware;

        if let Some(reporter) = self.reporter {
            router = router.merge(Arc::clone(&reporter).routes());
            middleware.push(Arc::new(HttpMetrics::new(reporter)?));
        }

        Ok(Server {
            port: self.port,
            debug_port: self.debug_port,
            router,
            middleware,
            draining,
        })
    }
}

fn validate_port(port: &str) -> Result<()> {
    port.parse::<u16>()
        .map(|_| ())
        .map_err(|_| WebError::InvalidConfig(format!("port must be a valid port number, got {port:?}")))
}

fn parse_pattern(pattern: &str) -> Result<(Option<MethodFilter>, &str)> {
    let (method, path) = match pattern.split_once(' ') {
        Some((method, path)) => (Some(method), path),
        None => (None, pattern),
    };

    if !path.starts_with('/') {
        return Err(WebError::InvalidPattern(pattern.to_string()));
    }

    let filter = match method {
        None => None,
        Some(method) => {
            let method = Method::from_bytes(method.as_bytes())
                .map_err(|_| WebError::InvalidPattern(pattern.to_string()))?;
            Some(
                MethodFilter::try_from(method)
                    .map_err(|_| WebError::InvalidPattern(pattern.to_string()))?,
            )
        }
    };

    Ok((filter, path))
}
