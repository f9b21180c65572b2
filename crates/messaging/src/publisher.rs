use std::sync::Arc;

use async_trait::async_trait;

use crate::{IntegrationEvent, PublishError};

/// Port for sending integration events to a broker destination.
///
/// Implementations must be thread-safe (Send + Sync). A returned `Ok` means
/// the destination accepted the message; there is no retry behind it.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publishes one event to `exchange` under `routing_key`.
    async fn publish(
        &self,
        event: &IntegrationEvent,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), PublishError>;
}

#[async_trait]
impl<T: MessagePublisher + ?Sized> MessagePublisher for Arc<T> {
    async fn publish(
        &self,
        event: &IntegrationEvent,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), PublishError> {
        (**self).publish(event, exchange, routing_key).await
    }
}
