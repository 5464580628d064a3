//! chassis-svc: the service binary's library.
//!
//! Wires the config loader, the selected metrics backend, the middleware
//! chain, and the greeter routes into a runnable server. Consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app;
pub mod config;
pub mod service;
