//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the controller depends on:
//! - HostDocument: the live, lazily loaded list it reads and drags within
//! - StatusSink: the single status line the UI shell displays
//!
//! Adapters implement these so the sort loop stays independent of any
//! particular page or driver.

pub mod host_document;
pub mod status_sink;

pub use host_document::HostDocument;
pub use status_sink::StatusSink;
