//! Main application modules.
//!
//! This module provides URL acquisition and end-of-run statistics used by the
//! run orchestration.

pub mod statistics;
pub mod url;

// Re-export public API
pub use statistics::log_failure_statistics;
pub use url::{clean_url, extract_url, extract_urls, UrlSource};
