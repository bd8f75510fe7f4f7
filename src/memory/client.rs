//! Client for the topic usage event store.
//!
//! The store is an append-only event log hosted by a managed memory
//! service, scoped by (actor, session). Each event carries the topic label
//! of one generated question. The client appends events and reads them
//! back within a trailing window; it never caches locally.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// Default per-request timeout for memory service calls.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// One recorded instance of a topic being used to generate a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicUsageEvent {
    /// Actor that recorded the event.
    pub actor_id: String,
    /// Session scope, equal to the exam identifier.
    pub session_scope: String,
    /// Topic label of the generated question. Never empty when recorded.
    pub topic_label: String,
    /// Instant the event was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Append and bounded read-back of topic usage events.
///
/// Implementations perform network I/O; both operations fail with
/// `StoreError` on transport or API errors, which callers may choose to
/// swallow (topic diversification is an enhancement, not a requirement).
#[async_trait]
pub trait TopicEventStore: Send + Sync {
    /// Appends one event with the current instant as timestamp.
    async fn record(
        &self,
        actor_id: &str,
        session_scope: &str,
        topic_label: &str,
    ) -> Result<(), StoreError>;

    /// Returns events in the scope whose timestamp falls within `window`
    /// of the current instant. The store may already apply retention;
    /// client-side filtering must still be correct when the store returns
    /// a superset.
    async fn list_recent(
        &self,
        actor_id: &str,
        session_scope: &str,
        max_results: u32,
        window: Duration,
    ) -> Result<Vec<TopicUsageEvent>, StoreError>;
}

/// Client for the managed memory service's event data plane.
pub struct AgentMemoryClient {
    /// Base URL of the memory service.
    endpoint: String,
    /// Identifier of the memory store.
    store_id: String,
    /// HTTP client for API requests.
    http_client: Client,
}

impl AgentMemoryClient {
    /// Creates a new memory client.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Base URL of the memory service data plane
    /// * `store_id` - Identifier of the memory store to use
    /// * `timeout` - Per-request timeout
    pub fn new(
        endpoint: impl Into<String>,
        store_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            store_id: store_id.into(),
            http_client,
        })
    }

    /// Returns the store identifier.
    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    fn events_url(&self, actor_id: &str, session_scope: &str) -> String {
        format!(
            "{}/stores/{}/actors/{}/sessions/{}/events",
            self.endpoint.trim_end_matches('/'),
            self.store_id,
            actor_id,
            session_scope
        )
    }
}

/// Request body for appending one event.
#[derive(Debug, Serialize)]
struct CreateEventRequest {
    messages: Vec<EventMessage>,
    #[serde(rename = "eventTimestamp")]
    event_timestamp: DateTime<Utc>,
}

/// One message within an event payload.
#[derive(Debug, Serialize)]
struct EventMessage {
    text: String,
    role: String,
}

/// Response envelope for the event listing call.
#[derive(Debug, Deserialize)]
struct ListEventsResponse {
    #[serde(default)]
    events: Vec<ApiEvent>,
}

/// One event as returned by the service. Timestamps arrive in more than
/// one shape depending on service revision, so both fields stay loose and
/// are interpreted leniently.
#[derive(Debug, Deserialize)]
struct ApiEvent {
    #[serde(rename = "eventTimestamp", default)]
    event_timestamp: Value,
    #[serde(default)]
    payload: Vec<Value>,
}

/// Interprets a timestamp value that may be an RFC 3339 string or a unix
/// epoch number. Returns `None` for anything unparseable.
fn parse_event_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            if let Some(secs) = n.as_i64() {
                Utc.timestamp_opt(secs, 0).single()
            } else {
                n.as_f64()
                    .and_then(|f| Utc.timestamp_opt(f as i64, 0).single())
            }
        }
        _ => None,
    }
}

/// Extracts the topic label from an event payload.
///
/// The payload is a list of conversational items; the topic is the text of
/// the first item with role USER. Malformed items yield `None`.
fn extract_topic_label(payload: &[Value]) -> Option<String> {
    for item in payload {
        let Some(conversational) = item.get("conversational") else {
            continue;
        };
        let role = conversational
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let text = conversational
            .get("content")
            .and_then(|c| c.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if role == "USER" && !text.is_empty() {
            return Some(text.to_string());
        }
    }
    None
}

#[async_trait]
impl TopicEventStore for AgentMemoryClient {
    async fn record(
        &self,
        actor_id: &str,
        session_scope: &str,
        topic_label: &str,
    ) -> Result<(), StoreError> {
        let request = CreateEventRequest {
            messages: vec![EventMessage {
                text: topic_label.to_string(),
                role: "USER".to_string(),
            }],
            event_timestamp: Utc::now(),
        };

        let url = self.events_url(actor_id, session_scope);
        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                code: status.as_u16(),
                message: body,
            });
        }

        tracing::info!(
            session_scope = %session_scope,
            topic = %topic_label,
            "Recorded topic usage event"
        );
        Ok(())
    }

    async fn list_recent(
        &self,
        actor_id: &str,
        session_scope: &str,
        max_results: u32,
        window: Duration,
    ) -> Result<Vec<TopicUsageEvent>, StoreError> {
        let url = self.events_url(actor_id, session_scope);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("maxResults", max_results.to_string()),
                ("includePayload", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                code: status.as_u16(),
                message: body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let body: ListEventsResponse = serde_json::from_str(&text)?;

        let cutoff = Utc::now()
            - chrono::Duration::from_std(window)
                .unwrap_or_else(|_| chrono::Duration::days(crate::config::DEFAULT_RECENCY_WINDOW_DAYS));

        // The store may apply retention on its own; filter anyway so a
        // superset response still honors the window.
        let mut events = Vec::new();
        for api_event in body.events {
            let Some(timestamp) = parse_event_timestamp(&api_event.event_timestamp) else {
                continue;
            };
            if timestamp <= cutoff {
                continue;
            }
            let Some(topic_label) = extract_topic_label(&api_event.payload) else {
                continue;
            };
            events.push(TopicUsageEvent {
                actor_id: actor_id.to_string(),
                session_scope: session_scope.to_string(),
                topic_label,
                timestamp,
            });
        }

        tracing::info!(
            session_scope = %session_scope,
            count = events.len(),
            "Fetched recent topic usage events"
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conversational_item(text: &str, role: &str) -> Value {
        json!({
            "conversational": {
                "content": { "text": text },
                "role": role,
            }
        })
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let value = json!("2026-08-01T12:00:00+00:00");
        let parsed = parse_event_timestamp(&value).expect("parseable timestamp");
        assert_eq!(parsed.to_rfc3339(), "2026-08-01T12:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_offset_normalized_to_utc() {
        let value = json!("2026-08-01T21:00:00+09:00");
        let parsed = parse_event_timestamp(&value).expect("parseable timestamp");
        assert_eq!(parsed.to_rfc3339(), "2026-08-01T12:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_epoch_seconds() {
        let value = json!(1_754_049_600);
        assert!(parse_event_timestamp(&value).is_some());
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_event_timestamp(&json!("not a date")).is_none());
        assert!(parse_event_timestamp(&json!(null)).is_none());
        assert!(parse_event_timestamp(&json!({"nested": true})).is_none());
    }

    #[test]
    fn test_extract_topic_label_user_item() {
        let payload = vec![conversational_item("Security", "USER")];
        assert_eq!(extract_topic_label(&payload), Some("Security".to_string()));
    }

    #[test]
    fn test_extract_topic_label_skips_non_user_roles() {
        let payload = vec![
            conversational_item("ignored", "ASSISTANT"),
            conversational_item("Networking", "USER"),
        ];
        assert_eq!(
            extract_topic_label(&payload),
            Some("Networking".to_string())
        );
    }

    #[test]
    fn test_extract_topic_label_malformed_payload() {
        let payload = vec![json!({"unexpected": "shape"}), json!(42)];
        assert_eq!(extract_topic_label(&payload), None);
    }

    #[test]
    fn test_extract_topic_label_skips_malformed_then_finds_user() {
        let payload = vec![
            json!({"unexpected": "shape"}),
            conversational_item("Storage", "USER"),
        ];
        assert_eq!(extract_topic_label(&payload), Some("Storage".to_string()));
    }

    #[test]
    fn test_extract_topic_label_empty_text() {
        let payload = vec![conversational_item("", "USER")];
        assert_eq!(extract_topic_label(&payload), None);
    }

    #[test]
    fn test_events_url_shape() {
        let client = AgentMemoryClient::new(
            "https://memory.test.local/",
            "mem-001",
            Duration::from_secs(5),
        )
        .expect("client builds");

        assert_eq!(
            client.events_url("actor-a", "AWS-SAP"),
            "https://memory.test.local/stores/mem-001/actors/actor-a/sessions/AWS-SAP/events"
        );
    }
}
