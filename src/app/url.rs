//! URL acquisition and cleaning.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::URL_EXTRACT_PATTERN;
use crate::error_handling::InputError;

#[allow(clippy::expect_used)] // The pattern is a compile-time constant
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(URL_EXTRACT_PATTERN).expect("URL pattern is valid"));

/// Where the run's URLs come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    /// Exactly one URL, taken as given.
    Single(String),
    /// A text file; the first `https://` match on each line is used.
    File(PathBuf),
}

impl UrlSource {
    /// Produces the raw (uncleaned) URL list in input order.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] if the file cannot be opened or a read fails
    /// part way through. No partial list is returned in that case.
    pub async fn load(&self) -> Result<Vec<String>, InputError> {
        match self {
            UrlSource::Single(url) => Ok(vec![url.clone()]),
            UrlSource::File(path) => extract_urls(path).await,
        }
    }
}

/// Scans `path` line by line and collects the first URL match on each line.
pub async fn extract_urls(path: &Path) -> Result<Vec<String>, InputError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| InputError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    // Lines are read as bytes: stray non-UTF-8 text must not abort the run
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut urls = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|source| InputError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(trim_line_ending(&buf));
        match extract_url(&line) {
            Some(url) => urls.push(url.to_string()),
            None => debug!("No URL on line: {line}"),
        }
    }

    info!("Extracted {} URL(s) from {}", urls.len(), path.display());
    Ok(urls)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Returns the first `https://` match on a line, if any.
pub fn extract_url(line: &str) -> Option<&str> {
    URL_REGEX.find(line).map(|m| m.as_str())
}

/// Strips trailing commas left behind when URLs are pulled out of lists.
pub fn clean_url(url: &str) -> String {
    url.trim_end_matches(',').to_string()
}
