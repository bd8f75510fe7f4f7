//! Recency tracking over topic usage events.
//!
//! Derives a `DiversityContext` from the event store. Failure here must
//! never block question generation, so every store or parse error is
//! logged and answered with an empty context.

use std::sync::Arc;
use std::time::Duration;

use crate::diversity::DiversityContext;
use crate::memory::client::TopicEventStore;

/// Produces diversity contexts from recent topic usage events.
pub struct RecencyTracker {
    store: Arc<dyn TopicEventStore>,
    actor_id: String,
    window: Duration,
    max_events: u32,
}

impl RecencyTracker {
    /// Creates a tracker reading events recorded under `actor_id`.
    pub fn new(
        store: Arc<dyn TopicEventStore>,
        actor_id: impl Into<String>,
        window: Duration,
        max_events: u32,
    ) -> Self {
        Self {
            store,
            actor_id: actor_id.into(),
            window,
            max_events,
        }
    }

    /// Returns the diversity context for one exam session.
    ///
    /// Fails open: if the store is unavailable the context is empty and
    /// generation proceeds without diversity steering.
    pub async fn recent_topics(&self, exam_id: &str) -> DiversityContext {
        match self
            .store
            .list_recent(&self.actor_id, exam_id, self.max_events, self.window)
            .await
        {
            Ok(events) => {
                let context = DiversityContext::from_labels(
                    events.into_iter().map(|event| event.topic_label),
                );
                tracing::info!(
                    exam_id = %exam_id,
                    topics = ?context.recent_topics,
                    "Recent topics resolved"
                );
                context
            }
            Err(e) => {
                tracing::warn!(
                    exam_id = %exam_id,
                    error = %e,
                    "Recent topic lookup failed, continuing without diversity context"
                );
                DiversityContext::empty()
            }
        }
    }

    /// Records one topic usage event for an exam session.
    ///
    /// Failures are returned to the caller, which decides whether to
    /// swallow them (the pipeline does).
    pub async fn record_usage(
        &self,
        exam_id: &str,
        topic_label: &str,
    ) -> Result<(), crate::error::StoreError> {
        self.store
            .record(&self.actor_id, exam_id, topic_label)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::client::TopicUsageEvent;
    use async_trait::async_trait;
    use chrono::Utc;

    struct StubStore {
        labels: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl TopicEventStore for StubStore {
        async fn record(
            &self,
            _actor_id: &str,
            _session_scope: &str,
            _topic_label: &str,
        ) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("stub".to_string()));
            }
            Ok(())
        }

        async fn list_recent(
            &self,
            actor_id: &str,
            session_scope: &str,
            _max_results: u32,
            _window: Duration,
        ) -> Result<Vec<TopicUsageEvent>, StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("stub".to_string()));
            }
            Ok(self
                .labels
                .iter()
                .map(|label| TopicUsageEvent {
                    actor_id: actor_id.to_string(),
                    session_scope: session_scope.to_string(),
                    topic_label: label.to_string(),
                    timestamp: Utc::now(),
                })
                .collect())
        }
    }

    fn tracker(store: StubStore) -> RecencyTracker {
        RecencyTracker::new(
            Arc::new(store),
            "test-actor",
            Duration::from_secs(7 * 24 * 60 * 60),
            10,
        )
    }

    #[tokio::test]
    async fn test_recent_topics_dedup_order() {
        let tracker = tracker(StubStore {
            labels: vec!["Security", "Networking", "Security"],
            fail: false,
        });

        let context = tracker.recent_topics("AWS-SAP").await;
        assert_eq!(context.recent_topics, vec!["Security", "Networking"]);
        assert_eq!(context.count_for("Security"), 2);
    }

    #[tokio::test]
    async fn test_recent_topics_fails_open() {
        let tracker = tracker(StubStore {
            labels: vec![],
            fail: true,
        });

        let context = tracker.recent_topics("AWS-SAP").await;
        assert!(context.is_empty());
        assert!(context.frequency_counts.is_empty());
    }

    #[tokio::test]
    async fn test_record_usage_propagates_error_to_caller() {
        let tracker = tracker(StubStore {
            labels: vec![],
            fail: true,
        });

        let result = tracker.record_usage("AWS-SAP", "Security").await;
        assert!(result.is_err());
    }
}
