use crate::alert::compose::{AlertDetails, AlertRequest, Severity};
use crate::alert::dispatch::EventSender;
use crate::utils::errors::{PagerError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const CLIENT_NAME: &str = "x509-expiry-pager";
const CLIENT_URL: &str = env!("CARGO_PKG_REPOSITORY");
const EVENT_ACTION_TRIGGER: &str = "trigger";

/// Events API v2 request body
#[derive(Debug, Serialize)]
pub struct V2Event<'a> {
    pub routing_key: &'a str,
    pub event_action: &'static str,
    pub dedup_key: &'a str,
    pub client: &'static str,
    pub client_url: &'static str,
    pub payload: V2Payload<'a>,
}

#[derive(Debug, Serialize)]
pub struct V2Payload<'a> {
    pub summary: &'a str,
    pub source: &'a str,
    pub severity: Severity,
    pub group: &'a str,
    pub class: &'a str,
    pub custom_details: &'a AlertDetails,
}

/// Events API v2 response body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub dedup_key: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

pub struct PagerDutyClient {
    client: Client,
    routing_key: String,
    events_url: String,
}

impl PagerDutyClient {
    pub fn new(routing_key: String, events_url: String) -> Result<Self> {
        let client = super::create_http_client()?;

        Ok(Self {
            client,
            routing_key,
            events_url,
        })
    }

    /// Get events endpoint
    pub fn events_url(&self) -> &str {
        &self.events_url
    }

    /// Wrap an alert into a trigger event for this routing key
    pub fn build_event<'a>(&'a self, alert: &'a AlertRequest) -> V2Event<'a> {
        V2Event {
            routing_key: &self.routing_key,
            event_action: EVENT_ACTION_TRIGGER,
            dedup_key: &alert.dedup_key,
            client: CLIENT_NAME,
            client_url: CLIENT_URL,
            payload: V2Payload {
                summary: &alert.summary,
                source: &alert.source,
                severity: alert.severity,
                group: &alert.group,
                class: &alert.class,
                custom_details: &alert.details,
            },
        }
    }

    /// POST one trigger event.
    ///
    /// Non-2xx answers become `AlertApi`. A 2xx answer may still carry
    /// `errors`, which the caller reports separately.
    pub async fn send_event(&self, alert: &AlertRequest) -> Result<EventResponse> {
        let event = self.build_event(alert);
        tracing::debug!(
            "Posting {} event for {} to {}",
            alert.severity,
            alert.dedup_key,
            self.events_url
        );

        let response = self
            .client
            .post(&self.events_url)
            .header("Content-Type", "application/json")
            .json(&event)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("Response status: {}", status);

        let parsed = serde_json::from_str::<EventResponse>(&body).ok();

        if status.is_success() {
            Ok(parsed.unwrap_or_else(|| EventResponse {
                status: status.to_string(),
                message: body,
                dedup_key: None,
                errors: Vec::new(),
            }))
        } else {
            let (message, errors) = match parsed {
                Some(resp) => (resp.message, resp.errors),
                None => (body, Vec::new()),
            };
            Err(PagerError::AlertApi {
                status: status.to_string(),
                message,
                errors,
            })
        }
    }
}

impl EventSender for PagerDutyClient {
    async fn send(&self, alert: &AlertRequest) -> Result<EventResponse> {
        self.send_event(alert).await
    }
}
