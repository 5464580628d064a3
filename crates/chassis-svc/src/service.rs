//! Placeholder business logic.

#[derive(Clone, Default)]
pub struct Service;

impl Service {
    pub fn new() -> Self {
        Self
    }

    pub fn say_hello(&self) -> &'static str {
        "hello"
    }
}
