//! Repository implementations for the Dashboard domain

pub mod leads;
pub mod orders;

use sqlx::PgPool;

pub use leads::LeadRepository;
pub use orders::OrderRepository;

/// Combined repository access for the Dashboard domain
#[derive(Clone)]
pub struct DashboardRepositories {
    pub orders: OrderRepository,
    pub leads: LeadRepository,
}

impl DashboardRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool.clone()),
            leads: LeadRepository::new(pool),
        }
    }
}
