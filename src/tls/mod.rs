//! TLS connection and peer certificate capture.
//!
//! This module connects to HTTPS endpoints without verifying trust and keeps
//! whatever certificate chain the server presented:
//! - [`CertTransport`]: the seam between the fetcher and the network
//! - [`RustlsTransport`]: the real implementation over `tokio-rustls`
//! - [`extract`]: CN and SAN extraction with `x509-parser`
//!
//! A transport reports one of two shapes. Either no TLS session ever existed
//! ([`Exchange::Failed`]), or a session exists and the HTTP request on top of
//! it may or may not have succeeded ([`Exchange::Established`]). The
//! certificate chain is usable in the second case regardless of the request.

pub mod extract;
mod verifier;

use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;

use log::debug;
use rustls::client::Resumption;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tokio_rustls::rustls::ClientConfig;
use tokio_rustls::TlsConnector;
use url::{Host, Url};

use crate::config::{FetchConfig, DEFAULT_HTTPS_PORT, MAX_RESPONSE_HEAD_BYTES};
use crate::error_handling::{FetchError, InitializationError};

pub use verifier::AcceptAnyCertificate;

/// TLS state captured right after the handshake.
#[derive(Debug, Clone, Default)]
pub struct TlsSession {
    /// DER-encoded peer chain, leaf first. May be empty.
    pub peer_certificates: Vec<Vec<u8>>,
    pub protocol_version: Option<String>,
}

/// Result of one attempt against a URL.
#[derive(Debug)]
pub enum Exchange {
    /// No TLS session was established.
    Failed(FetchError),
    /// The handshake completed. `request_error` is set when the HTTP exchange
    /// that followed failed.
    Established {
        session: TlsSession,
        request_error: Option<FetchError>,
    },
}

/// Something that can perform one certificate-capturing request.
pub trait CertTransport: Send + Sync + 'static {
    fn exchange(&self, url: &str) -> impl Future<Output = Exchange> + Send;
}

/// Real transport: TCP, then TLS with [`AcceptAnyCertificate`], then one
/// HTTP/1.1 GET whose status line is read and discarded.
pub struct RustlsTransport {
    connector: TlsConnector,
    config: FetchConfig,
}

impl RustlsTransport {
    /// Builds the transport and its TLS client configuration.
    ///
    /// The crypto provider is passed into the client config directly rather
    /// than installed process-wide.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::TlsConfigError` if the provider cannot
    /// supply the default protocol versions.
    pub fn new(config: FetchConfig) -> Result<Self, InitializationError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let mut client_config = ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate::new(provider)))
            .with_no_client_auth();
        client_config.alpn_protocols = vec![b"http/1.1".to_vec()];
        if !config.keep_alive {
            client_config.resumption = Resumption::disabled();
        }

        Ok(RustlsTransport {
            connector: TlsConnector::from(Arc::new(client_config)),
            config,
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn run(&self, url: &str) -> Exchange {
        let deadline = Instant::now() + self.config.timeout;

        let target = match Target::parse(url) {
            Ok(target) => target,
            Err(e) => return Exchange::Failed(e),
        };

        let addr = format!("{}:{}", target.host, target.port);
        debug!("Connecting to {addr}");
        let connect = TcpStream::connect((target.host.as_str(), target.port));
        let sock = match timeout_at(deadline, connect).await {
            Ok(Ok(sock)) => sock,
            Ok(Err(source)) => return Exchange::Failed(FetchError::Connect { addr, source }),
            Err(_) => return Exchange::Failed(FetchError::Timeout(self.config.timeout)),
        };

        let handshake = self.connector.connect(target.server_name.clone(), sock);
        let mut tls_stream = match timeout_at(deadline, handshake).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Exchange::Failed(FetchError::Handshake {
                    host: target.host,
                    source,
                })
            }
            Err(_) => return Exchange::Failed(FetchError::Timeout(self.config.timeout)),
        };

        let connection = tls_stream.get_ref().1;
        let session = TlsSession {
            peer_certificates: connection
                .peer_certificates()
                .map(|certs| certs.iter().map(|cert| cert.as_ref().to_vec()).collect())
                .unwrap_or_default(),
            protocol_version: connection.protocol_version().map(|v| format!("{v:?}")),
        };
        debug!(
            "Handshake with {} complete ({}), {} peer certificate(s)",
            target.host,
            session.protocol_version.as_deref().unwrap_or("unknown version"),
            session.peer_certificates.len()
        );

        let request = build_request(&target, &self.config);
        let request_error = match timeout_at(deadline, send_request(&mut tls_stream, &request)).await
        {
            Ok(Ok(status)) => {
                debug!("{url} answered with HTTP {status}");
                None
            }
            Ok(Err(e)) => Some(e),
            Err(_) => Some(FetchError::Timeout(self.config.timeout)),
        };

        Exchange::Established {
            session,
            request_error,
        }
    }
}

impl CertTransport for RustlsTransport {
    fn exchange(&self, url: &str) -> impl Future<Output = Exchange> + Send {
        self.run(url)
    }
}

/// Host, port and request target pulled out of a URL.
#[derive(Debug)]
struct Target {
    host: String,
    port: u16,
    server_name: ServerName<'static>,
    path_and_query: String,
}

impl Target {
    fn parse(raw: &str) -> Result<Self, FetchError> {
        let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;
        if url.scheme() != "https" {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }

        let (host, server_name) = match url.host() {
            Some(Host::Domain(domain)) => {
                let name = ServerName::try_from(domain.to_string())
                    .map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;
                (domain.to_string(), name)
            }
            Some(Host::Ipv4(ip)) => (ip.to_string(), ServerName::from(IpAddr::V4(ip))),
            Some(Host::Ipv6(ip)) => (ip.to_string(), ServerName::from(IpAddr::V6(ip))),
            None => return Err(FetchError::InvalidUrl(format!("{raw}: missing host"))),
        };

        let port = url.port_or_known_default().unwrap_or(DEFAULT_HTTPS_PORT);
        let mut path_and_query = url.path().to_string();
        if let Some(query) = url.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        Ok(Target {
            host,
            port,
            server_name,
            path_and_query,
        })
    }

    /// Value for the Host header; IPv6 literals need their brackets back.
    fn host_header(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if self.port == DEFAULT_HTTPS_PORT {
            host
        } else {
            format!("{host}:{}", self.port)
        }
    }
}

fn build_request(target: &Target, config: &FetchConfig) -> String {
    let connection = if config.keep_alive { "keep-alive" } else { "close" };
    let encoding = if config.compression {
        "gzip, deflate"
    } else {
        "identity"
    };
    format!(
        "GET {} HTTP/1.1\r\n\
         Host: {}\r\n\
         User-Agent: {}\r\n\
         Accept: */*\r\n\
         Accept-Encoding: {encoding}\r\n\
         Connection: {connection}\r\n\
         \r\n",
        target.path_and_query,
        target.host_header(),
        config.user_agent,
    )
}

/// Writes the request and reads until the end of the response head.
///
/// Returns the status code. The body is never read and redirects are never
/// followed; the first response is the only one.
async fn send_request<S>(stream: &mut S, request: &str) -> Result<u16, FetchError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(FetchError::Request)?;
    stream.flush().await.map_err(FetchError::Request)?;

    let mut head = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.map_err(FetchError::Request)?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..n]);
        if head.windows(4).any(|w| w == b"\r\n\r\n") || head.len() >= MAX_RESPONSE_HEAD_BYTES {
            break;
        }
    }

    parse_status_line(&head)
}

fn parse_status_line(head: &[u8]) -> Result<u16, FetchError> {
    let text = String::from_utf8_lossy(head);
    let line = text.lines().next().unwrap_or_default();
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse()
            .map_err(|_| FetchError::MalformedResponse(format!("bad status code in `{line}`"))),
        _ if head.is_empty() => Err(FetchError::MalformedResponse(
            "connection closed before any response".to_string(),
        )),
        _ => Err(FetchError::MalformedResponse(format!(
            "unexpected status line `{line}`"
        ))),
    }
}
