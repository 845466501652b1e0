//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions (input, fetch, initialization)
//! - Failure categorization for statistics
//! - Thread-safe failure counters
//!
//! Only [`InputError`] is fatal to a run. Every [`FetchError`] stays inside the
//! task that produced it and is reported for that URL alone.

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{FailureKind, FetchError, InitializationError, InputError};
