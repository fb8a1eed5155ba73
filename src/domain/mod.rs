//! Core domain types and logic.

pub mod aggregation;
pub mod config_validation;
pub mod error;
pub mod listing;
pub mod record;
pub mod summary;
pub mod summary_service;
