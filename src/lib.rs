//! brandspend: summary statistics over brand advertising spend.
//!
//! Hexagonal layout: aggregation logic in [`domain`], port traits in
//! [`ports`], concrete stores and renderers in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
