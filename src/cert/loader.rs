use crate::utils::errors::{PagerError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use x509_parser::pem::Pem;
use x509_parser::prelude::*;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";
const BEGIN_MARKER: &[u8] = b"-----BEGIN ";

/// A decoded certificate that has not yet been tagged with its source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCertificate {
    pub subject: String,
    pub issuer: String,
    pub issuer_common_name: String,
    pub not_after: DateTime<Utc>,
    pub der: Vec<u8>,
}

pub struct PemLoader;

impl PemLoader {
    /// Read a PEM file and decode every certificate it holds.
    ///
    /// Only a failure to read the file is returned as an error. Bad blocks
    /// inside the file are logged and skipped.
    pub fn load_file(path: &Path) -> Result<Vec<ParsedCertificate>> {
        let content = fs::read(path).map_err(|source| PagerError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::parse_pem_bytes(&content, &path.display().to_string()))
    }

    /// Decode all certificates from PEM content, skipping foreign and broken blocks.
    ///
    /// A block that fails to decode is abandoned at its BEGIN line, so a
    /// missing END marker cannot swallow the block that follows it.
    pub fn parse_pem_bytes(content: &[u8], origin: &str) -> Vec<ParsedCertificate> {
        let mut certificates = Vec::new();
        let mut offset = 0;

        while let Some(begin) = find_begin_line(content, offset) {
            let pem = match Pem::read(Cursor::new(&content[begin..])) {
                Ok((pem, consumed)) => {
                    offset = begin + consumed;
                    pem
                }
                Err(e) => {
                    offset = line_end(content, begin);
                    let err = PagerError::MalformedPemBlock(format!("{e:?}"));
                    tracing::warn!("error decoding PEM block in file: {origin}, error: {err}");
                    continue;
                }
            };

            if pem.label != CERTIFICATE_LABEL {
                tracing::info!("Ignoring PEM block type {} in {}", pem.label, origin);
                continue;
            }

            match Self::parse_der_sequence(&pem.contents) {
                Ok(parsed) => certificates.extend(parsed),
                Err(e) => {
                    tracing::warn!("error parsing certificate in file: {origin}, error: {e}");
                }
            }
        }

        certificates
    }

    /// Parse one or more concatenated DER certificates.
    ///
    /// The block is all-or-nothing: one bad certificate rejects the whole block.
    fn parse_der_sequence(mut input: &[u8]) -> Result<Vec<ParsedCertificate>> {
        let mut parsed = Vec::new();

        while !input.is_empty() {
            let (rem, cert) = X509Certificate::from_der(input)
                .map_err(|e| PagerError::CertParsing(format!("DER parsing error: {e}")))?;
            let der = input[..input.len() - rem.len()].to_vec();
            parsed.push(Self::extract_certificate(&cert, der)?);
            input = rem;
        }

        Ok(parsed)
    }

    fn extract_certificate(cert: &X509Certificate, der: Vec<u8>) -> Result<ParsedCertificate> {
        let issuer_common_name = cert
            .issuer()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .unwrap_or("Unknown")
            .to_string();

        let not_after_ts = cert.validity().not_after.timestamp();
        let not_after = DateTime::from_timestamp(not_after_ts, 0).ok_or_else(|| {
            PagerError::CertParsing(format!("notAfter out of range: {not_after_ts}"))
        })?;

        Ok(ParsedCertificate {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            issuer_common_name,
            not_after,
            der,
        })
    }
}

/// Offset just past the newline ending the line that starts at `start`
fn line_end(content: &[u8], start: usize) -> usize {
    content[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(content.len(), |i| start + i + 1)
}

/// First line at or after `from` that opens a PEM block. `from` must be a line start.
fn find_begin_line(content: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    while pos < content.len() {
        if content[pos..].starts_with(BEGIN_MARKER) {
            return Some(pos);
        }
        pos = line_end(content, pos);
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};
    use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};

    /// Self-signed certificate as (PEM, DER), expiring January 1st of `not_after_year`
    pub(crate) fn generate_cert(cn: &str, not_after_year: i32) -> (String, Vec<u8>) {
        generate_cert_expiring(cn, not_after_year, std::time::Duration::ZERO)
    }

    /// Self-signed certificate expiring `extra` after January 1st of `not_after_year`
    pub(crate) fn generate_cert_expiring(
        cn: &str,
        not_after_year: i32,
        extra: std::time::Duration,
    ) -> (String, Vec<u8>) {
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, cn);
        params.distinguished_name = dn;
        params.not_after = rcgen::date_time_ymd(not_after_year, 1, 1) + extra;

        let key_pair = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        (cert.pem(), cert.der().to_vec())
    }

    pub(crate) fn pem_block(label: &str, contents: &[u8]) -> String {
        let encoded = general_purpose::STANDARD.encode(contents);
        let mut block = format!("-----BEGIN {label}-----\n");
        for chunk in encoded.as_bytes().chunks(64) {
            block.push_str(std::str::from_utf8(chunk).unwrap());
            block.push('\n');
        }
        block.push_str(&format!("-----END {label}-----\n"));
        block
    }

    #[test]
    fn test_single_certificate() {
        let (pem, der) = generate_cert("single.example.com", 2031);

        let certs = PemLoader::parse_pem_bytes(pem.as_bytes(), "single.pem");

        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].subject, "CN=single.example.com");
        assert_eq!(certs[0].issuer_common_name, "single.example.com");
        assert_eq!(certs[0].der, der);
        assert_eq!(
            certs[0].not_after,
            DateTime::parse_from_rfc3339("2031-01-01T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_skips_non_certificate_blocks() {
        let (pem, _) = generate_cert("mixed.example.com", 2031);
        let content = format!(
            "{}{}{}",
            pem_block("PRIVATE KEY", b"not really a key"),
            pem,
            pem_block("X509 CRL", b"not really a crl")
        );

        let certs = PemLoader::parse_pem_bytes(content.as_bytes(), "mixed.pem");

        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].subject, "CN=mixed.example.com");
    }

    #[test]
    fn test_malformed_certificate_block_does_not_abort_file() {
        let (pem, _) = generate_cert("valid.example.com", 2031);
        let content = format!(
            "{}{}",
            pem_block(CERTIFICATE_LABEL, b"definitely not DER"),
            pem
        );

        let certs = PemLoader::parse_pem_bytes(content.as_bytes(), "broken.pem");

        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].subject, "CN=valid.example.com");
    }

    #[test]
    fn test_bad_base64_block_is_skipped() {
        let (pem, _) = generate_cert("after.example.com", 2031);
        let content = format!(
            "-----BEGIN CERTIFICATE-----\n!!!not base64!!!\n-----END CERTIFICATE-----\n{pem}"
        );

        let certs = PemLoader::parse_pem_bytes(content.as_bytes(), "bad64.pem");

        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].subject, "CN=after.example.com");
    }

    #[test]
    fn test_bundled_block_yields_every_certificate() {
        let (_, first) = generate_cert("first.example.com", 2031);
        let (_, second) = generate_cert("second.example.com", 2032);
        let mut bundle = first.clone();
        bundle.extend_from_slice(&second);

        let content = pem_block(CERTIFICATE_LABEL, &bundle);
        let certs = PemLoader::parse_pem_bytes(content.as_bytes(), "bundle.pem");

        assert_eq!(certs.len(), 2);
        assert_eq!(certs[0].der, first);
        assert_eq!(certs[1].der, second);
        assert_eq!(certs[1].subject, "CN=second.example.com");
    }

    #[test]
    fn test_bundle_with_trailing_garbage_is_rejected() {
        let (_, first) = generate_cert("first.example.com", 2031);
        let mut bundle = first;
        bundle.extend_from_slice(b"trailing junk");

        let content = pem_block(CERTIFICATE_LABEL, &bundle);
        let certs = PemLoader::parse_pem_bytes(content.as_bytes(), "junk.pem");

        assert!(certs.is_empty());
    }

    #[test]
    fn test_no_pem_content() {
        assert!(PemLoader::parse_pem_bytes(b"", "empty.pem").is_empty());
        assert!(PemLoader::parse_pem_bytes(b"hello\nworld\n", "text.pem").is_empty());
    }

    #[test]
    fn test_truncated_trailer_keeps_earlier_certificates() {
        let (pem, _) = generate_cert("kept.example.com", 2031);
        let content = format!("{pem}-----BEGIN CERTIFICATE-----\nMIIB\n");

        let certs = PemLoader::parse_pem_bytes(content.as_bytes(), "truncated.pem");

        assert_eq!(certs.len(), 1);
    }

    #[test]
    fn test_missing_end_does_not_swallow_next_block() {
        let (pem, _) = generate_cert("next.example.com", 2031);
        let content = format!("-----BEGIN CERTIFICATE-----\nMIIB\n{pem}");

        let certs = PemLoader::parse_pem_bytes(content.as_bytes(), "unterminated.pem");

        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].subject, "CN=next.example.com");
    }

    #[test]
    fn test_nested_begin_recovers_both_sides() {
        let (first, _) = generate_cert("first.example.com", 2031);
        let (second, _) = generate_cert("second.example.com", 2032);
        let content = format!("{first}-----BEGIN CERTIFICATE-----\n{second}");

        let certs = PemLoader::parse_pem_bytes(content.as_bytes(), "nested.pem");

        let subjects: Vec<_> = certs.iter().map(|c| c.subject.as_str()).collect();
        assert_eq!(subjects, vec!["CN=first.example.com", "CN=second.example.com"]);
    }

    #[test]
    fn test_crlf_and_preamble_text() {
        let (pem, _) = generate_cert("crlf.example.com", 2031);
        let content = format!(
            "Certificate:\r\n    Data: not a block -----BEGIN CERTIFICATE-----\r\n{}",
            pem.replace('\n', "\r\n")
        );

        let certs = PemLoader::parse_pem_bytes(content.as_bytes(), "crlf.pem");

        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].subject, "CN=crlf.example.com");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = PemLoader::load_file(&dir.path().join("missing.pem"));

        assert!(matches!(result, Err(PagerError::FileUnreadable { .. })));
    }
}
