use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::{IntegrationEvent, MessagePublisher, PublishError};

/// Publisher used when no broker is configured.
///
/// Every call is counted. The serialized message is logged at info level;
/// an event that cannot be serialized is reported as `DeliveryFailed`.
#[derive(Debug, Clone, Default)]
pub struct NoOpPublisher {
    requests: Arc<AtomicU64>,
}

impl NoOpPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of publish calls received.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MessagePublisher for NoOpPublisher {
    async fn publish(
        &self,
        event: &IntegrationEvent,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), PublishError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("noop_publish_requests_total").increment(1);

        let message = serde_json::to_string(event).map_err(|e| {
            tracing::error!(exchange, routing_key, error = %e, "Failed to serialize message");
            PublishError::delivery_failed(exchange, routing_key, e)
        })?;
        tracing::info!(
            exchange,
            routing_key,
            event_id = %event.event_id,
            %message,
            "No broker configured, skipping publish"
        );

        Ok(())
    }
}
