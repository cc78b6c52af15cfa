//! Public form handlers
//!
//! Anyone may submit; nothing here is guarded.

use axum::{extract::State, http::StatusCode, Json};
use energram_common::{Result, ValidatedJson};

use crate::api::middleware::DashboardState;
use crate::{
    ContactMessage, ContactSubmission, Order, OrderSubmission, PartnershipInquiry,
    PartnershipSubmission, WaitlistEntry, WaitlistSubmission,
};

/// Join the waitlist
///
/// **POST /v1/waitlist**
pub async fn join_waitlist(
    State(state): State<DashboardState>,
    ValidatedJson(request): ValidatedJson<WaitlistSubmission>,
) -> Result<(StatusCode, Json<WaitlistEntry>)> {
    let entry = state
        .repos
        .leads
        .add_to_waitlist(&request.into_entry())
        .await?;

    tracing::info!(entry_id = %entry.id, "Waitlist entry added");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Send a contact message
///
/// **POST /v1/contact**
pub async fn send_contact(
    State(state): State<DashboardState>,
    ValidatedJson(request): ValidatedJson<ContactSubmission>,
) -> Result<(StatusCode, Json<ContactMessage>)> {
    let message = state
        .repos
        .leads
        .add_contact(&request.into_message())
        .await?;

    tracing::info!(message_id = %message.id, "Contact message received");
    Ok((StatusCode::CREATED, Json(message)))
}

/// Submit a partnership inquiry
///
/// **POST /v1/partnerships**
pub async fn submit_partnership(
    State(state): State<DashboardState>,
    ValidatedJson(request): ValidatedJson<PartnershipSubmission>,
) -> Result<(StatusCode, Json<PartnershipInquiry>)> {
    let inquiry = state
        .repos
        .leads
        .add_partnership(&request.into_inquiry())
        .await?;

    tracing::info!(inquiry_id = %inquiry.id, "Partnership inquiry received");
    Ok((StatusCode::CREATED, Json(inquiry)))
}

/// Place an order
///
/// **POST /v1/orders**
///
/// The order is stored as `pending` with the plan's price.
pub async fn place_order(
    State(state): State<DashboardState>,
    ValidatedJson(request): ValidatedJson<OrderSubmission>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.repos.orders.create(&request.into_order()).await?;

    tracing::info!(
        order_id = %order.id,
        plan = ?order.plan,
        amount = %order.amount,
        "Order placed"
    );
    Ok((StatusCode::CREATED, Json(order)))
}
