//! # Connector Layer
//!
//! External integrations implementing the application ports:
//! - Completion endpoint over HTTP (plus an offline echo service)
//! - Terminal rendering
//! - Command wiring for the binary

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
