//! Result output.
//!
//! Certificate records are written as CSV; failures and the human-readable
//! rendering go to a separate status stream.

mod csv;

pub use self::csv::{CsvSink, SinkSummary};
