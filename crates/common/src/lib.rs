//! Shared utilities, configuration, and error handling for Energram
//!
//! This crate provides common functionality used across the Energram workspace:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - State machine and repository error types
//! - Request extractors

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::{Config, DevAccount};
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::{Pagination, ValidatedJson};
pub use state::StateError;
