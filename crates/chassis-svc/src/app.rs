//! Application wiring: backend selection and server construction.

use std::sync::Arc;

use chassis_metrics::{PullReporter, PushReporter, Reporter};
use chassis_web::{HttpLogging, Result, Server};

use crate::api::GreeterHandler;
use crate::config::{MetricsBackend, ServiceConfig};
use crate::service::Service;

pub fn build_reporter(backend: MetricsBackend) -> Arc<dyn Reporter> {
    match backend {
        MetricsBackend::Pull => Arc::new(PullReporter::new()),
        MetricsBackend::Push => Arc::new(PushReporter::new()),
    }
}

/// Build the fully wired server: logging middleware first (outermost),
/// then the reporter with its instrumentation middleware and routes, then
/// the business routes.
pub fn build_server(cfg: &ServiceConfig) -> Result<Server> {
    let reporter = build_reporter(cfg.metrics);
    let mut server = Server::builder()
        .port(cfg.port.clone())
        .debug_port(cfg.debug_port.clone())
        .middleware(Arc::new(HttpLogging::new()))
        .reporter(reporter)
        .build()?;

    GreeterHandler::new(Service::new()).routes(&mut server)?;
    Ok(server)
}
