//! Error type definitions.
//!
//! This module defines all error types used throughout the application.

use std::path::PathBuf;
use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error building the TLS client configuration.
    #[error("TLS client initialization error: {0}")]
    TlsConfigError(#[from] rustls::Error),
}

/// Failure to acquire the URL list. Always fatal to the run.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to fetch a certificate for one URL.
///
/// These never abort the run: the URL is reported and skipped.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported scheme `{0}`, only https carries a certificate")]
    UnsupportedScheme(String),

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("HTTP request failed: {0}")]
    Request(#[source] std::io::Error),

    #[error("malformed HTTP response: {0}")]
    MalformedResponse(String),

    #[error("failed to parse peer certificate: {0}")]
    Certificate(String),

    #[error("fetch task failed: {0}")]
    TaskFailed(String),
}

impl FetchError {
    /// The statistics bucket this failure is counted under.
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Timeout(_) => FailureKind::Timeout,
            FetchError::Certificate(_) => FailureKind::Certificate,
            FetchError::TaskFailed(_) => FailureKind::Task,
            FetchError::InvalidUrl(_)
            | FetchError::UnsupportedScheme(_)
            | FetchError::Connect { .. }
            | FetchError::Handshake { .. }
            | FetchError::Request(_)
            | FetchError::MalformedResponse(_) => FailureKind::Connection,
        }
    }
}

/// Categories of failures counted while a run is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    /// No TLS session was established (bad URL, refused, reset, handshake failure).
    Connection,
    /// The per-fetch deadline elapsed before a TLS session existed.
    Timeout,
    /// The leaf certificate could not be parsed.
    Certificate,
    /// The fetch task itself died (panic).
    Task,
    /// A record could not be written to the CSV output.
    Write,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Connection => "connection",
            FailureKind::Timeout => "timeout",
            FailureKind::Certificate => "certificate",
            FailureKind::Task => "task",
            FailureKind::Write => "write",
        }
    }
}
