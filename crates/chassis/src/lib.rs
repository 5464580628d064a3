//! Top-level facade crate for chassis.
//!
//! Re-exports the metrics abstraction and the web server so users can depend on a single crate.

pub mod metrics {
    pub use chassis_metrics::*;
}

pub mod web {
    pub use chassis_web::*;
}
