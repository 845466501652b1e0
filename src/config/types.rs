use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use super::constants::{DEFAULT_THREADS, DEFAULT_USER_AGENT, FETCH_TIMEOUT};

/// Long flags that may be written Go-style with a single dash (`-input=urls.txt`).
const LONG_FLAGS: &[&str] = &[
    "input",
    "output",
    "url",
    "threads",
    "timeout-seconds",
    "log-level",
    "log-format",
];

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace). Used with the `--log-level` CLI option.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Every https:// URL found in a file, eight at a time
/// certscan --input targets.txt --threads 8 --output certs.csv
///
/// # A single URL, CSV on stdout
/// certscan -url=https://example.com
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "certscan",
    about = "Fetches TLS certificate common names and SANs for a list of HTTPS URLs."
)]
pub struct Opt {
    /// Input file with URLs (first https:// match per line is used)
    #[arg(long, value_parser)]
    pub input: Option<PathBuf>,

    /// Output file for saving results (CSV on stdout when omitted)
    #[arg(long, value_parser)]
    pub output: Option<PathBuf>,

    /// Single URL to process (takes precedence over --input)
    #[arg(long)]
    pub url: Option<String>,

    /// Number of concurrent fetches
    #[arg(long, default_value_t = DEFAULT_THREADS, value_parser = parse_threads)]
    pub threads: usize,

    /// Overall deadline for each fetch, in seconds
    #[arg(long, default_value_t = FETCH_TIMEOUT.as_secs())]
    pub timeout_seconds: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Opt {
    /// Parses the process arguments, accepting Go-style single-dash long flags.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// The immutable client settings every fetch in this run uses.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(self.timeout_seconds),
            ..FetchConfig::default()
        }
    }
}

fn parse_threads(raw: &str) -> Result<usize, String> {
    let threads: usize = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a whole number"))?;
    if threads == 0 {
        return Err("threads must be at least 1".to_string());
    }
    Ok(threads)
}

/// Rewrites `-input=x` / `-threads 3` style arguments to their `--` form.
///
/// Only the known long flag names are touched, so short flags like `-h` keep
/// their meaning.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text.starts_with("--") || !text.starts_with('-') {
                return arg;
            }
            let name = text[1..].split('=').next().unwrap_or_default();
            if LONG_FLAGS.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}

/// Client settings for certificate fetches.
///
/// Built once per run and shared read-only by every fetch task. Redirects are
/// never followed: the first response on the connection is the only one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Deadline for the whole attempt.
    pub timeout: Duration,
    pub user_agent: String,
    /// Session resumption and `Connection: keep-alive`. Off by default.
    pub keep_alive: bool,
    /// Ask for compressed bodies. Off by default.
    pub compression: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout: FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            keep_alive: false,
            compression: false,
        }
    }
}
