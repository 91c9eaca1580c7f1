//! HTTP routes.

pub mod health;
pub mod proxy;

pub use health::{HealthResponse, health_routes};
pub use proxy::proxy_handler;
