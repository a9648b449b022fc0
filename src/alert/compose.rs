use crate::cert::{ExpiryClassification, ExpiryReport};
use chrono::Duration;
use serde::Serialize;
use std::fmt;

pub const ALERT_CLASS: &str = "x509 certificate expiry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

impl Severity {
    /// Critical inside the last 24 hours, warning before that
    pub fn for_time_to_expiry(time_to_expiry: Duration) -> Self {
        if time_to_expiry < Duration::hours(24) {
            Severity::Critical
        } else {
            Severity::Warning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-facing fields attached to the incident
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlertDetails {
    pub subject: String,
    pub issuer: String,
    pub filename: String,
    pub fingerprint_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRequest {
    pub dedup_key: String,
    pub severity: Severity,
    pub summary: String,
    pub source: String,
    pub group: String,
    pub class: String,
    pub details: AlertDetails,
}

/// Key the incident API uses to fold repeated triggers into one incident.
///
/// Only the host and file name take part, so a file replaced by a different
/// certificate keeps updating the same incident.
pub fn dedup_key(hostname: &str, source_file: &str) -> String {
    format!("{hostname}_{source_file}")
}

/// Remaining lifetime in fractional days (negative once expired)
pub fn days_to_expiry(time_to_expiry: Duration) -> f64 {
    time_to_expiry.num_milliseconds() as f64 / 86_400_000.0
}

/// Build the alert for one near-expiry certificate
pub fn compose_alert(classification: &ExpiryClassification<'_>, hostname: &str) -> AlertRequest {
    let record = classification.record;
    let days = days_to_expiry(classification.time_to_expiry);

    AlertRequest {
        dedup_key: dedup_key(hostname, &record.source_file),
        severity: Severity::for_time_to_expiry(classification.time_to_expiry),
        summary: format!(
            "certificate {} is {days:.2} days from expiring",
            record.source_file
        ),
        source: hostname.to_string(),
        group: format!("certificates monitored on {hostname}"),
        class: ALERT_CLASS.to_string(),
        details: AlertDetails {
            subject: record.subject.clone(),
            issuer: record.issuer.clone(),
            filename: record.source_file.clone(),
            fingerprint_sha256: record.sha256_fingerprint(),
        },
    }
}

/// One alert per near-expiry certificate, in inventory order
pub fn compose_alerts(report: &ExpiryReport<'_>, hostname: &str) -> Vec<AlertRequest> {
    report
        .near_expiry()
        .map(|classification| compose_alert(classification, hostname))
        .collect()
}
