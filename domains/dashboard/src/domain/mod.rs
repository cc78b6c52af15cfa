//! Dashboard domain layer: entities, order lifecycle, statistics, submission validation

pub mod entities;
pub mod state;
pub mod stats;
pub mod validation;
