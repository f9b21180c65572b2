//! Forwards domain events to the message broker.

use std::sync::Arc;

use async_trait::async_trait;
use domain::ProductEvent;
use messaging::{MessagePublisher, PRODUCT_EXCHANGE, translate};
use tokio_util::sync::CancellationToken;

use crate::cancel::cancellable;
use crate::error::{AppError, Result};
use crate::event_bus::EventSubscriber;

/// Event subscriber that translates each domain event into an integration
/// event and publishes it exactly once.
pub struct IntegrationEventBridge {
    publisher: Arc<dyn MessagePublisher>,
    exchange: String,
}

impl IntegrationEventBridge {
    /// Creates a bridge publishing to the default product exchange.
    pub fn new(publisher: Arc<dyn MessagePublisher>) -> Self {
        Self::with_exchange(publisher, PRODUCT_EXCHANGE)
    }

    pub fn with_exchange(
        publisher: Arc<dyn MessagePublisher>,
        exchange: impl Into<String>,
    ) -> Self {
        Self {
            publisher,
            exchange: exchange.into(),
        }
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }
}

#[async_trait]
impl EventSubscriber for IntegrationEventBridge {
    fn name(&self) -> &str {
        "integration-event-bridge"
    }

    #[tracing::instrument(skip_all, fields(exchange = %self.exchange))]
    async fn on_event(&self, event: &ProductEvent, cancel: &CancellationToken) -> Result<()> {
        let integration_event = translate(event);
        let routing_key = integration_event.routing_key();

        tracing::info!(
            product_id = %integration_event.product_id(),
            event_id = %integration_event.event_id,
            routing_key,
            "Publishing {}",
            integration_event.event_type()
        );

        let published = cancellable(
            cancel,
            self.publisher
                .publish(&integration_event, &self.exchange, routing_key),
        )
        .await;

        match published {
            Ok(()) => {
                metrics::counter!(
                    "integration_events_published_total",
                    "routing_key" => routing_key
                )
                .increment(1);
                Ok(())
            }
            Err(e) => {
                if matches!(e, AppError::DeliveryFailed(_)) {
                    metrics::counter!(
                        "integration_events_failed_total",
                        "routing_key" => routing_key
                    )
                    .increment(1);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ProductId;
    use domain::{Entity, Product};
    use messaging::{InMemoryPublisher, IntegrationPayload};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_publishes_translated_event() {
        let publisher = InMemoryPublisher::new();
        let bridge = IntegrationEventBridge::new(Arc::new(publisher.clone()));
        let product = Product::create("Widget", "A useful widget", Decimal::new(1999, 2)).unwrap();

        bridge
            .on_event(&ProductEvent::created(&product), &CancellationToken::new())
            .await
            .unwrap();

        let published = publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].exchange, "product.events");
        assert_eq!(published[0].routing_key, "product.created");
        assert_eq!(published[0].event.product_id(), product.id());
        assert!(matches!(
            published[0].event.payload,
            IntegrationPayload::ProductCreated { .. }
        ));
    }

    #[tokio::test]
    async fn test_custom_exchange() {
        let publisher = InMemoryPublisher::new();
        let bridge = IntegrationEventBridge::with_exchange(Arc::new(publisher.clone()), "catalog");

        bridge
            .on_event(&ProductEvent::deleted(ProductId::new()), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(publisher.published()[0].exchange, "catalog");
    }

    #[tokio::test]
    async fn test_publish_failure_is_delivery_failed() {
        let publisher = InMemoryPublisher::new();
        publisher.set_fail_on_publish(true);
        let bridge = IntegrationEventBridge::new(Arc::new(publisher.clone()));

        let err = bridge
            .on_event(&ProductEvent::deleted(ProductId::new()), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DeliveryFailed(_)));
        assert_eq!(publisher.attempt_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_publish_sends_nothing() {
        let publisher = InMemoryPublisher::new();
        let bridge = IntegrationEventBridge::new(Arc::new(publisher.clone()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = bridge
            .on_event(&ProductEvent::deleted(ProductId::new()), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cancelled));
        assert_eq!(publisher.attempt_count(), 0);
    }
}
