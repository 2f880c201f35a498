//! CLI command implementations.

pub mod config;
pub mod schedule;
pub mod sort;
