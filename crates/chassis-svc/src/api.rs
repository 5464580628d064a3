//! Business routes.

use axum::http::StatusCode;

use chassis_web::{Result, Server};

use crate::service::Service;

pub struct GreeterHandler {
    service: Service,
}

impl GreeterHandler {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    /// Mount the greeter endpoint and the catch-all 404.
    pub fn routes(self, server: &mut Server) -> Result<()> {
        let service = self.service;
        server.handle("GET /helloworld", move || {
            let service = service.clone();
            async move { (StatusCode::OK, service.say_hello()) }
        })?;
        server.fallback(|| async { StatusCode::NOT_FOUND });
        Ok(())
    }
}
