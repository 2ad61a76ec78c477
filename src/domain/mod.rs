//! # Domain Layer
//!
//! Session state, settings and conversation models, and the error type.
//! This layer knows nothing about HTTP or the terminal.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
