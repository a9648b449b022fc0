pub mod compose;
pub mod dispatch;

pub use compose::{compose_alert, compose_alerts, dedup_key, AlertDetails, AlertRequest, Severity};
pub use dispatch::{dispatch_alerts, DispatchOutcome, DispatchSummary, EventSender};
