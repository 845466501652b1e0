// Shared test helpers: certificate minting and fake transports.
//
// Included from each integration test file with `#[path = "helpers.rs"]`.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use certscan::tls::{CertTransport, Exchange, TlsSession};
use certscan::FetchError;
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};

/// Mints a self-signed certificate and returns it with its key pair.
#[allow(dead_code)] // Used by other test files
pub fn self_signed(cn: &str, sans: &[&str]) -> (rcgen::Certificate, KeyPair) {
    let mut params = CertificateParams::new(sans.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        .expect("Failed to create certificate parameters");
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    params.distinguished_name = dn;
    let key_pair = KeyPair::generate().expect("Failed to generate key pair");
    let cert = params
        .self_signed(&key_pair)
        .expect("Failed to create self-signed certificate");
    (cert, key_pair)
}

/// DER of a self-signed leaf with the given names.
#[allow(dead_code)] // Used by other test files
pub fn leaf_der(cn: &str, sans: &[&str]) -> Vec<u8> {
    self_signed(cn, sans).0.der().to_vec()
}

/// Host part of an `https://host/...` URL.
#[allow(dead_code)] // Used by other test files
pub fn host_of(url: &str) -> &str {
    url.trim_start_matches("https://")
        .split('/')
        .next()
        .unwrap_or_default()
}

/// Decides what a fake exchange returns based on the URL:
/// - host starting with `timeout` fails with a timeout
/// - host starting with `empty` completes a handshake with no certificates
/// - anything else presents a certificate whose CN is the host, with the
///   host and `www.<host>` as SANs
#[allow(dead_code)] // Used by other test files
pub fn scripted_exchange(url: &str) -> Exchange {
    let host = host_of(url);
    if host.starts_with("timeout") {
        return Exchange::Failed(FetchError::Timeout(Duration::from_secs(40)));
    }
    if host.starts_with("empty") {
        return Exchange::Established {
            session: TlsSession::default(),
            request_error: None,
        };
    }
    let www = format!("www.{host}");
    Exchange::Established {
        session: TlsSession {
            peer_certificates: vec![leaf_der(host, &[host, www.as_str()])],
            protocol_version: Some("TLSv1_3".to_string()),
        },
        request_error: None,
    }
}

/// Fake transport that sleeps for a fixed latency and tracks how many
/// exchanges overlap.
#[allow(dead_code)] // Used by other test files
pub struct LatencyTransport {
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[allow(dead_code)] // Used by other test files
impl LatencyTransport {
    pub fn new(delay: Duration) -> Self {
        LatencyTransport {
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CertTransport for LatencyTransport {
    fn exchange(&self, url: &str) -> impl Future<Output = Exchange> + Send {
        let url = url.to_string();
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            scripted_exchange(&url)
        }
    }
}
