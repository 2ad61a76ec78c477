//! # Application Layer
//!
//! The completion client and interaction loop, plus the ports they talk
//! through.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
