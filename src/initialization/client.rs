//! Certificate transport initialization.

use std::sync::Arc;

use crate::config::FetchConfig;
use crate::error_handling::InitializationError;
use crate::tls::RustlsTransport;

/// Initializes the TLS transport shared by every fetch task.
///
/// Creates a [`RustlsTransport`] configured with:
/// - Certificate verification disabled (any presented chain is accepted)
/// - Session resumption disabled, `Connection: close` on the request
/// - `Accept-Encoding: identity`
/// - No redirect following
/// - The overall per-fetch timeout from `config`
///
/// # Errors
///
/// Returns `InitializationError::TlsConfigError` if the TLS client
/// configuration cannot be built.
pub fn init_transport(config: FetchConfig) -> Result<Arc<RustlsTransport>, InitializationError> {
    let transport = RustlsTransport::new(config)?;
    log::debug!(
        "TLS transport ready (timeout {}s, user agent {:?})",
        transport.config().timeout.as_secs(),
        transport.config().user_agent
    );
    Ok(Arc::new(transport))
}
