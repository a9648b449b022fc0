use crate::cert::loader::ParsedCertificate;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;

/// One certificate found on disk, tagged with the file it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    pub source_file: String,
    pub subject: String,
    pub issuer: String,
    pub issuer_common_name: String,
    pub not_after: DateTime<Utc>,
    pub der: Vec<u8>,
}

impl CertificateRecord {
    pub fn new(source_file: &str, parsed: ParsedCertificate) -> Self {
        Self {
            source_file: source_file.to_string(),
            subject: parsed.subject,
            issuer: parsed.issuer,
            issuer_common_name: parsed.issuer_common_name,
            not_after: parsed.not_after,
            der: parsed.der,
        }
    }

    /// Lowercase hex SHA-256 over the DER encoding
    pub fn sha256_fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.der))
    }
}

impl fmt::Display for CertificateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File: {}, Subject: {}, Expires: {}",
            self.source_file,
            self.subject,
            self.not_after.format("%Y-%m-%d %H:%M")
        )
    }
}
