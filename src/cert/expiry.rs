use crate::cert::record::CertificateRecord;
use chrono::{DateTime, Duration, Utc};

/// A record paired with its remaining lifetime at evaluation time
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiryClassification<'a> {
    pub record: &'a CertificateRecord,
    pub time_to_expiry: Duration,
    pub near_expiry: bool,
}

/// Result of evaluating one inventory against one `now` sample
#[derive(Debug, Clone)]
pub struct ExpiryReport<'a> {
    pub evaluated_at: DateTime<Utc>,
    pub threshold_seconds: i64,
    pub classifications: Vec<ExpiryClassification<'a>>,
}

impl<'a> ExpiryReport<'a> {
    pub fn near_expiry(&self) -> impl Iterator<Item = &ExpiryClassification<'a>> {
        self.classifications.iter().filter(|c| c.near_expiry)
    }

    pub fn not_near_expiry(&self) -> impl Iterator<Item = &ExpiryClassification<'a>> {
        self.classifications.iter().filter(|c| !c.near_expiry)
    }

    /// Split into (near expiry, not near expiry), keeping inventory order
    pub fn partition(&self) -> (Vec<&ExpiryClassification<'a>>, Vec<&ExpiryClassification<'a>>) {
        self.classifications.iter().partition(|c| c.near_expiry)
    }
}

/// Classify every record against `threshold_seconds`.
///
/// `now` is sampled once by the caller so the whole batch shares one clock.
/// Expired certificates have a negative remaining time, so any non-negative threshold flags them.
pub fn evaluate(
    records: &[CertificateRecord],
    threshold_seconds: i64,
    now: DateTime<Utc>,
) -> ExpiryReport<'_> {
    let threshold = Duration::try_seconds(threshold_seconds);

    let classifications = records
        .iter()
        .map(|record| {
            let time_to_expiry = record.not_after - now;
            // A threshold beyond the representable range catches everything or nothing
            let near_expiry = match threshold {
                Some(threshold) => time_to_expiry < threshold,
                None => threshold_seconds > 0,
            };
            ExpiryClassification {
                record,
                time_to_expiry,
                near_expiry,
            }
        })
        .collect();

    ExpiryReport {
        evaluated_at: now,
        threshold_seconds,
        classifications,
    }
}

/// Render a duration as e.g. "2d 3h 4m 5s", prefixed with '-' when negative
pub fn format_remaining(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let secs = total.unsigned_abs();

    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{sign}{days}d {hours}h {minutes}m {seconds}s")
    } else if hours > 0 {
        format!("{sign}{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m {seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}
