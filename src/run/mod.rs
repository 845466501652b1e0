//! Run orchestration.
//!
//! Wires the URL source, the TLS transport, the bounded dispatcher and the
//! CSV sink together for one batch.

use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};

use crate::app::{log_failure_statistics, UrlSource};
use crate::config::{Opt, MISSING_INPUT_HINT};
use crate::dispatch::{outcome_channel, spawn_dispatcher};
use crate::error_handling::ProcessingStats;
use crate::export::CsvSink;
use crate::initialization::init_transport;
use crate::tls::CertTransport;

/// Results of a certificate sweep.
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// URLs submitted for processing, whatever their outcome
    pub total_urls: usize,
    /// Rows successfully written to the CSV output
    pub records_written: usize,
    /// URLs whose fetch failed
    pub fetch_failures: usize,
    /// Records that could not be written
    pub write_errors: usize,
    pub elapsed_seconds: f64,
}

/// Picks the URL source from the options. `--url` wins over `--input`.
///
/// Returns `None` when neither was given.
pub fn url_source(opt: &Opt) -> Option<UrlSource> {
    match (&opt.url, &opt.input) {
        (Some(url), _) => Some(UrlSource::Single(url.clone())),
        (None, Some(path)) => Some(UrlSource::File(path.clone())),
        (None, None) => None,
    }
}

/// Runs a sweep with the provided options.
///
/// CSV goes to `--output` (or stdout); record renderings, per-URL diagnostics
/// and the closing summary go to stdout.
///
/// # Errors
///
/// Only failures that stop the run before any fetch are returned:
/// - Neither `--url` nor `--input` was given
/// - The input file cannot be opened or read
/// - The TLS client configuration cannot be built
/// - The output file cannot be created
pub async fn run_sweep(opt: &Opt) -> Result<SweepReport> {
    let source = url_source(opt).ok_or_else(|| anyhow!(MISSING_INPUT_HINT))?;
    let urls = source.load().await.context("Error reading URLs")?;

    let transport =
        init_transport(opt.fetch_config()).context("Failed to initialize TLS transport")?;

    let output: Box<dyn Write + Send> = match &opt.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Error creating output file {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(io::stdout()),
    };

    Ok(run_with_transport(urls, opt.threads, transport, output, io::stdout()).await)
}

/// Fetches certificates for `urls` through `transport` and writes the results.
///
/// Per-URL failures never abort the run; they are printed to `status` and
/// counted in the report.
pub async fn run_with_transport<T, W, S>(
    urls: Vec<String>,
    threads: usize,
    transport: Arc<T>,
    output: W,
    status: S,
) -> SweepReport
where
    T: CertTransport,
    W: Write,
    S: Write,
{
    let start_time = Instant::now();
    let total_urls = urls.len();
    info!("Starting sweep of {total_urls} URL(s) with {threads} concurrent fetch(es)");

    let stats = Arc::new(ProcessingStats::new());
    let (sender, mut receiver) = outcome_channel();
    let dispatcher = spawn_dispatcher(urls, threads, transport, sender);

    let mut sink = CsvSink::new(output, status, Arc::clone(&stats));
    sink.drain(&mut receiver).await;

    if let Err(join_error) = dispatcher.await {
        warn!("Dispatcher task failed: {join_error}");
    }

    let summary = sink.finish(total_urls);
    log_failure_statistics(&stats);

    let elapsed_seconds = start_time.elapsed().as_secs_f64();
    info!(
        "Sweep finished in {:.2}s: {} record(s), {} failure(s), {} write error(s)",
        elapsed_seconds, summary.records_written, summary.fetch_failures, summary.write_errors
    );

    SweepReport {
        total_urls,
        records_written: summary.records_written,
        fetch_failures: summary.fetch_failures,
        write_errors: summary.write_errors,
        elapsed_seconds,
    }
}
