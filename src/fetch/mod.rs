//! Certificate fetching for a single URL.
//!
//! Sits between the dispatcher and a [`CertTransport`]: runs one exchange
//! and turns the captured TLS state into a [`CertificateRecord`].

use log::debug;

use crate::error_handling::FetchError;
use crate::models::CertificateRecord;
use crate::tls::extract::record_from_der;
use crate::tls::{CertTransport, Exchange};

/// Fetches the leaf certificate for `url` and extracts its names.
///
/// A failed HTTP request does not discard the TLS session it ran on: if the
/// handshake completed, the certificate it delivered is still extracted.
///
/// # Returns
///
/// - `Ok(Some(record))` when the server presented at least one certificate
/// - `Ok(None)` when a session exists but carries no peer certificates
///
/// # Errors
///
/// Returns the transport's [`FetchError`] when no TLS session was ever
/// established (bad URL, connect failure, handshake failure, timeout), or
/// `FetchError::Certificate` if the leaf does not parse.
pub async fn fetch_certificate<T>(
    url: &str,
    transport: &T,
) -> Result<Option<CertificateRecord>, FetchError>
where
    T: CertTransport,
{
    let session = match transport.exchange(url).await {
        Exchange::Failed(e) => return Err(e),
        Exchange::Established {
            session,
            request_error,
        } => {
            if let Some(e) = request_error {
                debug!("Request to {url} failed after handshake, using its certificate anyway: {e}");
            }
            session
        }
    };

    let Some(leaf) = session.peer_certificates.first() else {
        debug!("{url} presented no peer certificates");
        return Ok(None);
    };

    record_from_der(url, leaf).map(Some)
}
