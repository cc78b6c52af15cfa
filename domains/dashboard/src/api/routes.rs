//! Route definitions for Dashboard domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{admin, leads};
use super::middleware::DashboardState;

/// Public form submission routes
fn lead_routes() -> Router<DashboardState> {
    Router::new()
        .route("/v1/waitlist", post(leads::join_waitlist))
        .route("/v1/contact", post(leads::send_contact))
        .route("/v1/partnerships", post(leads::submit_partnership))
        .route("/v1/orders", post(leads::place_order))
}

/// Admin panel routes
fn admin_routes() -> Router<DashboardState> {
    Router::new()
        .route("/v1/admin/stats", get(admin::get_stats))
        .route("/v1/admin/orders", get(admin::list_orders))
        .route("/v1/admin/orders/{id}/payment", post(admin::confirm_payment))
        .route("/v1/admin/orders/{id}/cancel", post(admin::cancel_order))
        .route("/v1/admin/waitlist", get(admin::list_waitlist))
        .route("/v1/admin/contacts", get(admin::list_contacts))
        .route("/v1/admin/partnerships", get(admin::list_partnerships))
}

/// Create all Dashboard domain API routes
pub fn routes() -> Router<DashboardState> {
    Router::new().merge(lead_routes()).merge(admin_routes())
}
