//! Dashboard domain state and route guard integration

use crate::DashboardRepositories;
use axum::extract::FromRef;
use energram_auth::RouteGuard;

/// Application state for the Dashboard domain
#[derive(Clone)]
pub struct DashboardState {
    pub repos: DashboardRepositories,
    pub guard: RouteGuard,
}

impl FromRef<DashboardState> for RouteGuard {
    fn from_ref(state: &DashboardState) -> Self {
        state.guard.clone()
    }
}
