//! Dashboard domain: orders, waitlist, contacts, partnerships, admin statistics

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::state::{OrderEvent, OrderStateMachine};
pub use domain::stats::{calculate_stats, monthly_analytics, DashboardStats, MonthlyBucket};
pub use domain::validation::{
    ContactSubmission, OrderSubmission, PartnershipSubmission, PaymentConfirmation,
    WaitlistSubmission,
};

pub use repository::{DashboardRepositories, LeadRepository, OrderRepository};

// Re-export API types
pub use api::routes;
pub use api::DashboardState;
