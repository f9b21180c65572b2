//! In-process domain event fan-out.
//!
//! Command handlers only see [`EventNotifier`]. The default implementation,
//! [`DomainEventBus`], runs matching subscribers one after another in the
//! order they were registered and stops at the first failure.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{DomainEvent, ProductEvent, ProductEventKind};
use tokio_util::sync::CancellationToken;

use crate::cancel::cancellable;
use crate::error::{AppError, Result};

/// Delivers a domain event to everything interested in it.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    /// Returns once every interested party has handled `event`, or with the
    /// first failure.
    async fn notify(&self, event: &ProductEvent, cancel: &CancellationToken) -> Result<()>;
}

/// A consumer of domain events.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    async fn on_event(&self, event: &ProductEvent, cancel: &CancellationToken) -> Result<()>;
}

struct Subscription {
    kind: Option<ProductEventKind>,
    subscriber: Arc<dyn EventSubscriber>,
}

impl Subscription {
    fn matches(&self, kind: ProductEventKind) -> bool {
        self.kind.is_none_or(|k| k == kind)
    }
}

/// Synchronous, ordered, multi-subscriber event bus.
#[derive(Clone)]
pub struct DomainEventBus {
    subscriptions: Arc<Vec<Subscription>>,
}

impl DomainEventBus {
    pub fn builder() -> DomainEventBusBuilder {
        DomainEventBusBuilder::default()
    }

    /// Number of subscribers that would receive an event of `kind`.
    pub fn subscriber_count(&self, kind: ProductEventKind) -> usize {
        self.subscriptions
            .iter()
            .filter(|s| s.matches(kind))
            .count()
    }
}

#[async_trait]
impl EventNotifier for DomainEventBus {
    #[tracing::instrument(
        skip_all,
        fields(event_type = event.event_type(), product_id = %event.aggregate_id())
    )]
    async fn notify(&self, event: &ProductEvent, cancel: &CancellationToken) -> Result<()> {
        let kind = event.kind();
        metrics::counter!("domain_events_published_total", "event_type" => event.event_type())
            .increment(1);

        for subscription in self.subscriptions.iter().filter(|s| s.matches(kind)) {
            let subscriber = &subscription.subscriber;
            let outcome = cancellable(cancel, subscriber.on_event(event, cancel)).await;

            if let Err(e) = outcome {
                tracing::error!(
                    subscriber = subscriber.name(),
                    error = %e,
                    "Event subscriber failed"
                );
                return Err(AppError::Subscriber {
                    subscriber: subscriber.name().to_string(),
                    source: Box::new(e),
                });
            }
        }

        Ok(())
    }
}

/// Collects subscriptions for a [`DomainEventBus`].
#[derive(Default)]
pub struct DomainEventBusBuilder {
    subscriptions: Vec<Subscription>,
}

impl DomainEventBusBuilder {
    /// Subscribes to one event kind.
    pub fn subscribe(
        mut self,
        kind: ProductEventKind,
        subscriber: Arc<dyn EventSubscriber>,
    ) -> Self {
        self.subscriptions.push(Subscription {
            kind: Some(kind),
            subscriber,
        });
        self
    }

    /// Subscribes to every event kind.
    pub fn subscribe_all(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.subscriptions.push(Subscription {
            kind: None,
            subscriber,
        });
        self
    }

    pub fn build(self) -> DomainEventBus {
        DomainEventBus {
            subscriptions: Arc::new(self.subscriptions),
        }
    }
}
