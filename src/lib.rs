//! certscan library: TLS certificate name collection for batches of URLs
//!
//! This library connects to each HTTPS URL, accepts whatever certificate the
//! server presents, and records the leaf certificate's common name and DNS
//! subject alternative names. Fetches run concurrently under a fixed cap and
//! results are written as CSV in completion order.
//!
//! # Example
//!
//! ```no_run
//! use certscan::{run_sweep, Opt};
//! use clap::Parser;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let opt = Opt::parse_from(["certscan", "--input", "urls.txt", "--threads", "10"]);
//! let report = run_sweep(&opt).await?;
//! println!("{} of {} URLs produced a record", report.records_written, report.total_urls);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod error_handling;
pub mod export;
pub mod fetch;
pub mod initialization;
mod models;
mod run;
pub mod tls;

// Re-export public API
pub use config::{FetchConfig, LogFormat, LogLevel, Opt};
pub use error_handling::{FailureKind, FetchError, InputError};
pub use models::{CertificateRecord, FetchOutcome};
pub use run::{run_sweep, run_with_transport, url_source, SweepReport};
