pub mod alert;
pub mod cert;
pub mod cli;
pub mod config;
pub mod pagerduty;
pub mod utils;

pub use alert::{compose_alert, dispatch_alerts, AlertRequest, EventSender, Severity};
pub use cert::{evaluate, scan_directory, CertificateRecord, ExpiryClassification, PemLoader};
pub use cli::{args, commands};
pub use config::MonitorConfig;
pub use pagerduty::PagerDutyClient;
pub use utils::errors;
