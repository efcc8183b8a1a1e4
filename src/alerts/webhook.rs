// Alert delivery over HTTP webhooks

use std::time::Duration;

use super::Alert;
use crate::error::AlertError;

/// Destination for alerts. The manager only needs "deliver or fail".
pub trait AlertSink: Send + Sync {
    fn send(&self, alert: &Alert) -> Result<(), AlertError>;
}

/// POSTs each alert as JSON to a fixed URL.
/// Any 2xx response is success; everything else is an error. No retries.
#[derive(Debug)]
pub struct WebhookSink {
    url: String,
    client: reqwest::blocking::Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AlertError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AlertError::Client)?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AlertSink for WebhookSink {
    fn send(&self, alert: &Alert) -> Result<(), AlertError> {
        let response = self
            .client
            .post(&self.url)
            .json(alert)
            .send()
            .map_err(|source| AlertError::Delivery {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AlertError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
