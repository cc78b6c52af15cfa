//! HTTP handlers for the Dashboard domain

pub mod admin;
pub mod leads;
