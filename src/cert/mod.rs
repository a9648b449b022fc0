pub mod expiry;
pub mod loader;
pub mod record;
pub mod report;
pub mod scanner;

pub use expiry::{evaluate, format_remaining, ExpiryClassification, ExpiryReport};
pub use loader::{ParsedCertificate, PemLoader};
pub use record::CertificateRecord;
pub use report::{parse_columns, ReportColumn};
pub use scanner::scan_directory;
