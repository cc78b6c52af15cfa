//! Admin panel statistics

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::entities::{Order, WaitlistEntry};

/// Headline numbers for the admin overview
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_orders: usize,
    pub total_revenue: Decimal,
    pub pending_orders: usize,
    /// Orders with status `paid`
    pub completed_orders: usize,
    /// Waitlist entries plus orders
    pub total_users: usize,
    pub waitlist_count: usize,
}

pub fn calculate_stats(orders: &[Order], waitlist: &[WaitlistEntry]) -> DashboardStats {
    DashboardStats {
        total_orders: orders.len(),
        total_revenue: orders.iter().map(|order| order.amount).sum(),
        pending_orders: orders.iter().filter(|order| order.is_pending()).count(),
        completed_orders: orders.iter().filter(|order| order.is_paid()).count(),
        total_users: waitlist.len() + orders.len(),
        waitlist_count: waitlist.len(),
    }
}

/// Orders and revenue for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    /// Short month name, e.g. "Jan"
    pub month: String,
    pub orders: usize,
    pub revenue: Decimal,
}

/// Group orders by the month of `created_at`.
///
/// Buckets keep the order in which their month first appears, so feeding
/// orders newest first yields the most recent month first. Months from
/// different years share a bucket.
pub fn monthly_analytics(orders: &[Order]) -> Vec<MonthlyBucket> {
    let mut buckets: Vec<MonthlyBucket> = Vec::new();

    for order in orders {
        let month = order.created_at.format("%b").to_string();
        match buckets.iter_mut().find(|bucket| bucket.month == month) {
            Some(bucket) => {
                bucket.orders += 1;
                bucket.revenue += order.amount;
            }
            None => buckets.push(MonthlyBucket {
                month,
                orders: 1,
                revenue: order.amount,
            }),
        }
    }

    buckets
}
