//! API layer for the Dashboard domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::DashboardState;
pub use routes::routes;
