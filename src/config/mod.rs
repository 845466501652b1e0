//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, channel sizes, patterns)
//! - CLI option types and parsing
//! - The immutable [`FetchConfig`] handed to the certificate transport

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{normalize_args, FetchConfig, LogFormat, LogLevel, Opt};
