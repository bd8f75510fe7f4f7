//! Webhook notification sink.
//!
//! Serializes the final result bundle and POSTs it to the configured
//! endpoint with the shared secret embedded in the body, where the
//! receiving workflow verifies it. The sink reports failures as values;
//! it never panics into the caller, and the pipeline treats every
//! delivery failure as non-fatal.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::NotifyError;

/// Capability of being rendered to a JSON object for delivery.
///
/// The sink depends on this capability rather than on any concrete result
/// type, so result models and the sink compile independently.
pub trait NotifyPayload: Send + Sync {
    /// Renders the payload as a JSON value.
    fn to_payload(&self) -> Value;
}

impl NotifyPayload for Value {
    fn to_payload(&self) -> Value {
        self.clone()
    }
}

/// Trait for notification sinks.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one payload. Errors describe the failure; the caller
    /// decides whether to swallow them.
    async fn send(&self, payload: &dyn NotifyPayload) -> Result<(), NotifyError>;
}

/// Notifier delivering results through an HTTP webhook.
#[derive(Debug)]
pub struct WebhookNotifier {
    webhook_url: String,
    security_token: String,
    timeout: Duration,
    http_client: Client,
}

impl WebhookNotifier {
    /// Creates a notifier from explicit settings.
    pub fn new(
        webhook_url: impl Into<String>,
        security_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::DeliveryError(e.to_string()))?;

        Ok(Self {
            webhook_url: webhook_url.into(),
            security_token: security_token.into(),
            timeout,
            http_client,
        })
    }

    /// Creates a notifier from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::ConfigurationMissing` when the webhook URL or
    /// the shared secret is not configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, NotifyError> {
        let webhook_url = config
            .webhook_url
            .clone()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| NotifyError::ConfigurationMissing("webhook URL".to_string()))?;

        let security_token = config
            .webhook_token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                NotifyError::ConfigurationMissing("webhook security token".to_string())
            })?;

        Self::new(webhook_url, security_token, config.webhook_timeout)
    }

    /// Returns the delivery endpoint.
    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Builds the delivery body: the payload object with the shared
    /// secret added under `security_token`.
    fn secure_payload(&self, payload: &dyn NotifyPayload) -> Value {
        let mut body = match payload.to_payload() {
            Value::Object(map) => Value::Object(map),
            other => serde_json::json!({ "result": other }),
        };
        if let Value::Object(ref mut map) = body {
            map.insert(
                "security_token".to_string(),
                Value::String(self.security_token.clone()),
            );
        }
        body
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, payload: &dyn NotifyPayload) -> Result<(), NotifyError> {
        let body = self.secure_payload(payload);

        tracing::info!(url = %self.webhook_url, "Delivering result to webhook");

        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    let err = NotifyError::DeliveryTimeout {
                        seconds: self.timeout.as_secs(),
                    };
                    tracing::error!(error = %err, "Webhook delivery timed out");
                    err
                } else {
                    let err = NotifyError::DeliveryError(e.to_string());
                    tracing::error!(error = %err, "Webhook delivery failed");
                    err
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "Webhook rejected the delivery"
            );
            return Err(NotifyError::DeliveryRejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(status = status.as_u16(), "Webhook delivery completed");
        Ok(())
    }
}
