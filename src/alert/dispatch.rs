use crate::alert::compose::AlertRequest;
use crate::pagerduty::EventResponse;
use crate::utils::errors::Result;
use std::future::Future;

/// Anything that can deliver an alert to the incident API
pub trait EventSender {
    fn send(&self, alert: &AlertRequest) -> impl Future<Output = Result<EventResponse>> + Send;
}

#[derive(Debug)]
pub struct DispatchOutcome {
    pub filename: String,
    pub dedup_key: String,
    pub result: Result<EventResponse>,
}

impl DispatchOutcome {
    /// Delivered and accepted without API-reported errors
    pub fn is_accepted(&self) -> bool {
        matches!(&self.result, Ok(response) if response.errors.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct DispatchSummary {
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchSummary {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn accepted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_accepted()).count()
    }

    /// Delivered, but the API reported errors alongside a success status
    pub fn rejected(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(&o.result, Ok(response) if !response.errors.is_empty()))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Send every alert in order. A failure is logged against its certificate
/// and never stops the remaining alerts from going out.
pub async fn dispatch_alerts<S: EventSender>(sender: &S, alerts: &[AlertRequest]) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for alert in alerts {
        let result = sender.send(alert).await;

        match &result {
            Ok(response) if response.errors.is_empty() => {
                tracing::info!(
                    "PagerDuty response: {}, message: {}",
                    response.status,
                    response.message
                );
            }
            Ok(response) => {
                tracing::error!(
                    "PagerDuty response: {}, message: {}, errors: {:?}",
                    response.status,
                    response.message,
                    response.errors
                );
            }
            Err(e) => {
                tracing::error!(
                    "unable to post expiry alert for {} to PagerDuty, error: {e}",
                    alert.details.filename
                );
            }
        }

        summary.outcomes.push(DispatchOutcome {
            filename: alert.details.filename.clone(),
            dedup_key: alert.dedup_key.clone(),
            result,
        });
    }

    summary
}
