//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `certscan` library that handles:
//! - Command-line argument parsing (Go-style `-flag=value` accepted)
//! - Logger initialization
//! - User-facing output for run-level failures
//!
//! Every failure is reported as text; the exit status stays zero unless the
//! arguments themselves are unparseable.

use anyhow::{Context, Result};

use certscan::config::MISSING_INPUT_HINT;
use certscan::initialization::init_logger_with;
use certscan::{run_sweep, url_source, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse_normalized();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    if url_source(&opt).is_none() {
        println!("{MISSING_INPUT_HINT}");
        return Ok(());
    }

    match run_sweep(&opt).await {
        Ok(report) => {
            log::info!(
                "Processed {} URL{} in {:.1}s",
                report.total_urls,
                if report.total_urls == 1 { "" } else { "s" },
                report.elapsed_seconds
            );
        }
        Err(e) => println!("{e:#}"),
    }
    Ok(())
}
