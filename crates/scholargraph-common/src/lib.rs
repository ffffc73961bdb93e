//! ScholarGraph Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared logging setup for the ScholarGraph workspace: tracing subscriber
//! initialization with env-based configuration.

pub mod logging;

// Re-export commonly used types
pub use logging::{init_logging, LogConfig};
