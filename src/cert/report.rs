use crate::cert::expiry::{format_remaining, ExpiryClassification};
use crate::utils::errors::{PagerError, Result};
use crate::utils::output::GetColumnValue;
use std::str::FromStr;

pub const DEFAULT_COLUMNS: &[&str] = &["file", "subject", "not_after", "remaining", "near_expiry"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportColumn {
    File,
    Subject,
    Issuer,
    NotAfter,
    Remaining,
    NearExpiry,
    Fingerprint,
}

impl FromStr for ReportColumn {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" | "filename" => Ok(Self::File),
            "subject" => Ok(Self::Subject),
            "issuer" => Ok(Self::Issuer),
            "not_after" | "expires" => Ok(Self::NotAfter),
            "remaining" => Ok(Self::Remaining),
            "near_expiry" | "n" => Ok(Self::NearExpiry),
            "fingerprint" | "sha256" => Ok(Self::Fingerprint),
            _ => Err(format!("Invalid column: {s}")),
        }
    }
}

impl ReportColumn {
    pub fn header(&self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Subject => "Subject",
            Self::Issuer => "Issuer",
            Self::NotAfter => "Not After",
            Self::Remaining => "Remaining",
            Self::NearExpiry => "N",
            Self::Fingerprint => "SHA-256",
        }
    }
}

/// Parse a `--columns` value. A leading `+` appends to the defaults.
pub fn parse_columns(spec: Option<&str>) -> Result<Vec<ReportColumn>> {
    let names: Vec<&str> = match spec {
        None => DEFAULT_COLUMNS.to_vec(),
        Some(spec) => {
            let (mut names, extra) = match spec.strip_prefix('+') {
                Some(extra) => (DEFAULT_COLUMNS.to_vec(), extra),
                None => (Vec::new(), spec),
            };
            names.extend(extra.split(',').map(str::trim).filter(|s| !s.is_empty()));
            names
        }
    };

    if names.is_empty() {
        return Err(PagerError::Config("No report columns selected".to_string()));
    }

    names
        .into_iter()
        .map(|name| name.parse::<ReportColumn>().map_err(PagerError::Config))
        .collect()
}

impl GetColumnValue for ExpiryClassification<'_> {
    fn get_column_value(&self, column: &ReportColumn) -> String {
        match column {
            ReportColumn::File => self.record.source_file.clone(),
            ReportColumn::Subject => self.record.subject.clone(),
            ReportColumn::Issuer => self.record.issuer_common_name.clone(),
            ReportColumn::NotAfter => self.record.not_after.format("%Y-%m-%d %H:%M").to_string(),
            ReportColumn::Remaining => format_remaining(self.time_to_expiry),
            ReportColumn::NearExpiry => {
                if self.near_expiry {
                    "✗".to_string()
                } else {
                    " ".to_string()
                }
            }
            ReportColumn::Fingerprint => self.record.sha256_fingerprint(),
        }
    }
}
