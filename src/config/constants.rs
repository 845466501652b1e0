//! Configuration constants.

use std::time::Duration;

/// Default number of concurrent certificate fetches.
pub const DEFAULT_THREADS: usize = 5;

/// Overall deadline for one fetch attempt (connect, handshake and HTTP exchange).
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(40);

/// Capacity of the outcome channel between fetch tasks and the result sink.
///
/// Producers wait when the sink falls this far behind.
pub const OUTCOME_CHANNEL_CAPACITY: usize = 10;

/// Port used when a URL does not name one.
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Upper bound on bytes read while waiting for the response head.
///
/// Only the status line is inspected; anything past this is never read.
pub const MAX_RESPONSE_HEAD_BYTES: usize = 16 * 1024;

/// Pattern used to pull a URL out of an arbitrary line of text.
pub const URL_EXTRACT_PATTERN: &str = r"https://\S+";

/// User-Agent sent with the single HTTP request made per URL.
pub const DEFAULT_USER_AGENT: &str = concat!("certscan/", env!("CARGO_PKG_VERSION"));

/// Printed when neither an input file nor a single URL was supplied.
pub const MISSING_INPUT_HINT: &str =
    "Please specify an input file using -input=<filename> or a single URL using -url=<URL>";
