//! Admin panel handlers
//!
//! Every handler here requires an admin session via `RequireAdmin`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use energram_auth::{RequireAdmin, SessionView};
use energram_common::{Error, Pagination, Result, ValidatedJson};
use serde::Serialize;
use uuid::Uuid;

use crate::api::middleware::DashboardState;
use crate::{
    calculate_stats, monthly_analytics, ContactMessage, DashboardStats, MonthlyBucket, Order,
    PartnershipInquiry, PaymentConfirmation, WaitlistEntry,
};

fn admin_id(session: &SessionView) -> Option<&str> {
    session.identity().map(|identity| identity.id.as_str())
}

/// Overview payload for the dashboard landing tab
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub monthly: Vec<MonthlyBucket>,
}

/// Headline statistics and monthly analytics
///
/// **GET /v1/admin/stats**
pub async fn get_stats(
    RequireAdmin(session): RequireAdmin,
    State(state): State<DashboardState>,
) -> Result<Json<StatsResponse>> {
    let orders = state.repos.orders.list_all().await?;
    let waitlist = state.repos.leads.list_all_waitlist().await?;

    tracing::debug!(
        identity_id = ?admin_id(&session),
        orders = orders.len(),
        waitlist = waitlist.len(),
        "Computing dashboard statistics"
    );

    Ok(Json(StatsResponse {
        stats: calculate_stats(&orders, &waitlist),
        monthly: monthly_analytics(&orders),
    }))
}

/// **GET /v1/admin/orders**
pub async fn list_orders(
    _admin: RequireAdmin,
    State(state): State<DashboardState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.repos.orders.list(page).await?))
}

async fn load_order(state: &DashboardState, id: Uuid) -> Result<Order> {
    state
        .repos
        .orders
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Order {}", id)))
}

/// Mark a pending order paid with the payment provider's reference
///
/// **POST /v1/admin/orders/{id}/payment**
pub async fn confirm_payment(
    RequireAdmin(session): RequireAdmin,
    State(state): State<DashboardState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<PaymentConfirmation>,
) -> Result<Json<Order>> {
    let mut order = load_order(&state, id).await?;
    let previous = order.status;

    order.confirm_payment(&request.into_reference())?;
    let updated = state.repos.orders.update_status(&order, previous).await?;

    tracing::info!(
        order_id = %id,
        payment_ref = ?updated.payment_ref,
        confirmed_by = ?admin_id(&session),
        "Order payment confirmed"
    );

    Ok(Json(updated))
}

/// **POST /v1/admin/orders/{id}/cancel**
pub async fn cancel_order(
    RequireAdmin(session): RequireAdmin,
    State(state): State<DashboardState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>> {
    let mut order = load_order(&state, id).await?;
    let previous = order.status;

    order.cancel()?;
    let updated = state.repos.orders.update_status(&order, previous).await?;

    tracing::info!(order_id = %id, cancelled_by = ?admin_id(&session), "Order cancelled");

    Ok(Json(updated))
}

/// **GET /v1/admin/waitlist**
pub async fn list_waitlist(
    _admin: RequireAdmin,
    State(state): State<DashboardState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<WaitlistEntry>>> {
    Ok(Json(state.repos.leads.list_waitlist(page).await?))
}

/// **GET /v1/admin/contacts**
pub async fn list_contacts(
    _admin: RequireAdmin,
    State(state): State<DashboardState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ContactMessage>>> {
    Ok(Json(state.repos.leads.list_contacts(page).await?))
}

/// **GET /v1/admin/partnerships**
pub async fn list_partnerships(
    _admin: RequireAdmin,
    State(state): State<DashboardState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<PartnershipInquiry>>> {
    Ok(Json(state.repos.leads.list_partnerships(page).await?))
}
