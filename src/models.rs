use std::collections::BTreeSet;

use crate::error_handling::FetchError;

/// Identity fields read from the leaf certificate a server presented.
///
/// `subject_alt_names` is deduplicated and never contains `common_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    pub url: String,
    /// Subject CN, verbatim. Empty when the subject carries none.
    pub common_name: String,
    pub subject_alt_names: BTreeSet<String>,
}

impl CertificateRecord {
    /// Builds a record from raw certificate names.
    ///
    /// Duplicate DNS names collapse and the common name is dropped from the
    /// SAN set even when the certificate repeats it there.
    pub fn new<I>(url: impl Into<String>, common_name: impl Into<String>, dns_names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let common_name = common_name.into();
        let mut subject_alt_names: BTreeSet<String> = dns_names.into_iter().collect();
        subject_alt_names.remove(&common_name);
        CertificateRecord {
            url: url.into(),
            common_name,
            subject_alt_names,
        }
    }

    /// SAN names joined with newlines, as written into the single CSV field.
    pub fn joined_sans(&self) -> String {
        self.subject_alt_names
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Console rendering printed after the row is written.
    pub fn render(&self) -> String {
        format!(
            "URL: {}\nCommon Name: {}\nSANs:\n{}\n\n",
            self.url,
            self.common_name,
            self.joined_sans()
        )
    }
}

/// What a fetch task hands to the result sink.
///
/// A fetch that reached a server presenting no certificate sends nothing.
#[derive(Debug)]
pub enum FetchOutcome {
    Record(CertificateRecord),
    Failed { url: String, error: FetchError },
}
