//! CSV result sink.
//!
//! Drains fetch outcomes in completion order. Each record becomes one CSV row
//! `url, common name, SANs` with the SANs joined by newlines inside a single
//! quoted field. No header row is written.
//!
//! Each row is encoded on its own and handed to the output in a single write,
//! so a row whose write failed is never replayed in front of a later row.

use std::io::Write;
use std::sync::Arc;

use csv::WriterBuilder;
use log::warn;
use tokio::sync::mpsc::Receiver;

use crate::error_handling::{FailureKind, ProcessingStats};
use crate::models::{CertificateRecord, FetchOutcome};

/// Counts gathered while draining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkSummary {
    pub records_written: usize,
    pub fetch_failures: usize,
    pub write_errors: usize,
}

/// Writes records to a CSV destination and diagnostics to a status stream.
///
/// `W` is the CSV destination (file or stdout), `S` the human-readable status
/// stream. They are separate so CSV on stdout can still be captured cleanly
/// when status goes elsewhere.
pub struct CsvSink<W: Write, S: Write> {
    output: W,
    status: S,
    stats: Arc<ProcessingStats>,
    summary: SinkSummary,
}

impl<W: Write, S: Write> CsvSink<W, S> {
    pub fn new(output: W, status: S, stats: Arc<ProcessingStats>) -> Self {
        CsvSink {
            output,
            status,
            stats,
            summary: SinkSummary::default(),
        }
    }

    /// Consumes outcomes until every sender is gone.
    pub async fn drain(&mut self, receiver: &mut Receiver<FetchOutcome>) {
        while let Some(outcome) = receiver.recv().await {
            self.handle(outcome);
        }
    }

    /// Handles one outcome. Never fails: problems are reported and counted.
    pub fn handle(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Record(record) => self.write_record(&record),
            FetchOutcome::Failed { url, error } => {
                warn!("Failed to process URL {url}: {error}");
                self.stats.increment(error.kind());
                self.summary.fetch_failures += 1;
                self.status_line(&format!("Error processing URL {url}: {error}\n"));
            }
        }
    }

    fn write_record(&mut self, record: &CertificateRecord) {
        let result = encode_row(record).and_then(|row| {
            self.output.write_all(&row)?;
            self.output.flush()?;
            Ok(())
        });

        match result {
            Ok(()) => {
                self.summary.records_written += 1;
                self.status_line(&record.render());
            }
            Err(e) => {
                warn!("Failed to write CSV row for {}: {e}", record.url);
                self.stats.increment(FailureKind::Write);
                self.summary.write_errors += 1;
                self.status_line(&format!("Error writing record to csv: {e}\n"));
            }
        }
    }

    /// Flushes the CSV writer and prints the closing summary line.
    ///
    /// `total_urls` is the number of URLs submitted, including those that
    /// produced no record.
    pub fn finish(mut self, total_urls: usize) -> SinkSummary {
        if let Err(e) = self.output.flush() {
            warn!("Final CSV flush failed: {e}");
            self.status_line(&format!("Error writing csv: {e}\n"));
        }
        self.status_line(&format!(
            "Processing complete. {total_urls} URLs processed.\n"
        ));
        self.summary
    }

    fn status_line(&mut self, text: &str) {
        if let Err(e) = self.status.write_all(text.as_bytes()) {
            warn!("Failed to write status output: {e}");
        }
    }
}

/// Encodes one record as a complete CSV row, line terminator included.
fn encode_row(record: &CertificateRecord) -> Result<Vec<u8>, csv::Error> {
    let sans = record.joined_sans();
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record([record.url.as_str(), record.common_name.as_str(), sans.as_str()])?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::FetchError;
    use std::io;
    use std::time::Duration;

    /// Fails the first `failures` writes, then behaves like a `Vec`.
    struct Flaky {
        failures: usize,
        written: Vec<u8>,
    }

    impl Write for Flaky {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::other("disk full"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    fn record(url: &str, cn: &str, sans: &[&str]) -> CertificateRecord {
        CertificateRecord::new(url, cn, sans.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_failed_outcome_prints_diagnostic() {
        let stats = Arc::new(ProcessingStats::new());
        let mut status = Vec::new();
        let mut sink = CsvSink::new(Vec::new(), &mut status, Arc::clone(&stats));
        sink.handle(FetchOutcome::Failed {
            url: "https://slow.example".to_string(),
            error: FetchError::Timeout(Duration::from_secs(40)),
        });
        let summary = sink.finish(3);

        assert_eq!(summary.fetch_failures, 1);
        assert_eq!(summary.records_written, 0);
        assert_eq!(stats.get_count(FailureKind::Timeout), 1);
        let status = String::from_utf8(status).expect("utf8");
        assert!(status.contains("Error processing URL https://slow.example: timed out after 40s"));
        assert!(status.ends_with("Processing complete. 3 URLs processed.\n"));
    }

    #[test]
    fn test_write_failure_does_not_stop_consumption() {
        let stats = Arc::new(ProcessingStats::new());
        let mut status = Vec::new();
        let mut sink = CsvSink::new(BrokenPipe, &mut status, Arc::clone(&stats));
        sink.handle(FetchOutcome::Record(record("https://a.example", "a.example", &[])));
        sink.handle(FetchOutcome::Record(record("https://b.example", "b.example", &[])));
        let summary = sink.finish(2);

        assert_eq!(summary.write_errors, 2);
        assert_eq!(stats.get_count(FailureKind::Write), 2);
        let status = String::from_utf8(status).expect("utf8");
        assert_eq!(status.matches("Error writing record to csv").count(), 2);
        assert!(!status.contains("Common Name:"));
        assert!(status.contains("Processing complete. 2 URLs processed."));
    }

    #[test]
    fn test_failed_row_is_not_written_later() {
        let stats = Arc::new(ProcessingStats::new());
        let mut output = Flaky {
            failures: 1,
            written: Vec::new(),
        };
        let mut status = Vec::new();
        let mut sink = CsvSink::new(&mut output, &mut status, Arc::clone(&stats));
        sink.handle(FetchOutcome::Record(record("https://lost.example", "lost.example", &[])));
        sink.handle(FetchOutcome::Record(record("https://kept.example", "kept.example", &[])));
        let summary = sink.finish(2);

        assert_eq!(summary.write_errors, 1);
        assert_eq!(summary.records_written, 1);
        let written = String::from_utf8(output.written).expect("utf8");
        assert_eq!(written, "https://kept.example,kept.example,\n");
        let status = String::from_utf8(status).expect("utf8");
        assert!(status.contains("Error writing record to csv: disk full"));
        assert!(status.contains("URL: https://kept.example"));
    }
}
