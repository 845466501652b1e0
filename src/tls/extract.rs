//! Certificate extraction utilities.

use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension};

use crate::error_handling::FetchError;
use crate::models::CertificateRecord;

/// Builds a [`CertificateRecord`] from the DER bytes of a leaf certificate.
///
/// # Errors
///
/// Returns `FetchError::Certificate` if the DER does not parse as X.509.
pub fn record_from_der(url: &str, der: &[u8]) -> Result<CertificateRecord, FetchError> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| FetchError::Certificate(e.to_string()))?;

    let common_name = extract_common_name(&cert);
    let sans = extract_certificate_sans(&cert);
    log::debug!(
        "Leaf certificate for {url}: CN={common_name:?}, {} SAN(s)",
        sans.len()
    );

    Ok(CertificateRecord::new(url, common_name, sans))
}

/// Returns the last subject CN as a string, or an empty string if there is
/// none or it is not valid text. With several CN attributes the last one wins.
pub(crate) fn extract_common_name(cert: &X509Certificate<'_>) -> String {
    cert.subject()
        .iter_common_name()
        .last()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Extracts the DNS names from the Subject Alternative Name extension.
///
/// IP addresses, e-mail addresses and other name types are ignored.
/// Duplicates are kept; [`CertificateRecord::new`] collapses them.
pub(crate) fn extract_certificate_sans(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut sans = Vec::new();

    for ext in cert.extensions() {
        if let ParsedExtension::SubjectAlternativeName(ref san) = ext.parsed_extension() {
            for general_name in &san.general_names {
                if let GeneralName::DNSName(dns_name) = general_name {
                    sans.push(dns_name.to_string());
                }
            }
        }
    }

    sans
}
