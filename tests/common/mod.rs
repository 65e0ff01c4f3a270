//! Common test utilities
//!
//! - Persistence ports that record or reject writes
//! - Custom assertion macros

#[macro_use]
pub mod assertions;
pub mod ports;

pub use ports::*;
