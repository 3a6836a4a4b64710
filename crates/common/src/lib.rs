//! Snapstrip Common Utilities
//!
//! Shared infrastructure for all Snapstrip crates:
//! - Error types and result aliases
//! - Wall-clock and burst timing utilities
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
