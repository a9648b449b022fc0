pub mod client;

pub use client::{EventResponse, PagerDutyClient, V2Event, V2Payload};

use reqwest::Client;

pub const DEFAULT_EVENTS_URL: &str = "https://events.pagerduty.com/v2/enqueue";

/// Create the HTTP client used for the Events API
pub fn create_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .use_rustls_tls()
        .build()
}
