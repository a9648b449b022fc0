use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PagerError {
    #[error("Unable to read certificate directory {}: {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to read certificate file {}: {source}", .path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed PEM block: {0}")]
    MalformedPemBlock(String),

    #[error("Certificate parsing error: {0}")]
    CertParsing(String),

    #[error("PagerDuty transport error: {0}")]
    AlertTransport(#[from] reqwest::Error),

    #[error("PagerDuty API error: status {status}, message: {message}, errors: {errors:?}")]
    AlertApi {
        status: String,
        message: String,
        errors: Vec<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PagerError>;
