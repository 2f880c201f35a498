//! Domain layer for the playlist sorter
//!
//! This module contains the sort keys, snapshots, loop state and the port
//! traits the controller drives.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{SortError, SortResult};
