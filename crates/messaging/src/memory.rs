use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::{IntegrationEvent, MessagePublisher, PublishError};

/// A message captured by [`InMemoryPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub exchange: String,
    pub routing_key: String,
    pub event: IntegrationEvent,
}

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    messages: Vec<PublishedMessage>,
    attempts: usize,
    fail_on_publish: bool,
}

/// In-memory publisher for testing.
///
/// Clones share the recorded messages.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
    state: Arc<Mutex<InMemoryPublisherState>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to reject every publish call.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state().fail_on_publish = fail;
    }

    /// Returns the messages accepted so far, in publish order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.state().messages.clone()
    }

    pub fn published_count(&self) -> usize {
        self.state().messages.len()
    }

    /// Number of publish calls, including rejected ones.
    pub fn attempt_count(&self) -> usize {
        self.state().attempts
    }

    fn state(&self) -> MutexGuard<'_, InMemoryPublisherState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MessagePublisher for InMemoryPublisher {
    async fn publish(
        &self,
        event: &IntegrationEvent,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), PublishError> {
        let mut state = self.state();
        state.attempts += 1;

        if state.fail_on_publish {
            return Err(PublishError::delivery_failed(
                exchange,
                routing_key,
                "broker unavailable",
            ));
        }

        state.messages.push(PublishedMessage {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            event: event.clone(),
        });
        Ok(())
    }
}
