//! End-to-end tests of dispatch, persistence, event fan-out and publishing.

use std::collections::HashSet;
use std::sync::Arc;

use application::{
    AppError, CancellationToken, CreateProduct, DeleteProduct, DispatchError, Dispatcher,
    DomainEventBus, ErrorKind, EventSubscriber, GetProductById, IntegrationEventBridge,
    ListProducts, ProductDto, Request, RequestKind, UpdateProduct, integration_event_bus,
    product_dispatcher,
};
use async_trait::async_trait;
use common::ProductId;
use domain::ProductEvent;
use messaging::{InMemoryPublisher, IntegrationPayload};
use product_store::{InMemoryProductRepository, ProductRepository};
use rust_decimal::Decimal;

struct Harness {
    dispatcher: Dispatcher,
    repository: InMemoryProductRepository,
    publisher: InMemoryPublisher,
}

fn harness() -> Harness {
    let repository = InMemoryProductRepository::new();
    let publisher = InMemoryPublisher::new();
    let bus = integration_event_bus(Arc::new(publisher.clone()), "product.events");
    let dispatcher = product_dispatcher(Arc::new(repository.clone()), Arc::new(bus)).unwrap();

    Harness {
        dispatcher,
        repository,
        publisher,
    }
}

fn create(name: &str) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        description: format!("{name} description"),
        price: Decimal::new(2500, 2),
    }
}

impl Harness {
    async fn create(&self, name: &str) -> ProductDto {
        self.dispatcher
            .dispatch(create(name), CancellationToken::new())
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_create_publishes_one_integration_event() {
    let h = harness();

    let dto = h.create("Widget").await;

    assert_eq!(h.repository.len().await, 1);
    let published = h.publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].exchange, "product.events");
    assert_eq!(published[0].routing_key, "product.created");
    match &published[0].event.payload {
        IntegrationPayload::ProductCreated {
            product_id, name, ..
        } => {
            assert_eq!(*product_id, dto.id);
            assert_eq!(name, "Widget");
        }
        other => panic!("expected ProductCreated, got {other:?}"),
    }
}

#[tokio::test]
async fn test_full_lifecycle_emits_unique_event_ids() {
    let h = harness();
    let dto = h.create("Widget").await;

    h.dispatcher
        .dispatch(
            UpdateProduct {
                id: dto.id,
                name: "Gadget".to_string(),
                description: "Renamed".to_string(),
                price: Decimal::new(3000, 2),
            },
            CancellationToken::new(),
        )
        .await
        .unwrap();
    let deleted = h
        .dispatcher
        .dispatch(DeleteProduct { id: dto.id }, CancellationToken::new())
        .await
        .unwrap();

    assert!(deleted);
    let published = h.publisher.published();
    let keys: Vec<_> = published.iter().map(|m| m.routing_key.as_str()).collect();
    assert_eq!(keys, ["product.created", "product.updated", "product.deleted"]);

    let ids: HashSet<_> = published.iter().map(|m| m.event.event_id).collect();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn test_missing_product_raises_no_events() {
    let h = harness();
    let id = ProductId::new();

    let update = h
        .dispatcher
        .dispatch(
            UpdateProduct {
                id,
                name: "Gadget".to_string(),
                description: "desc".to_string(),
                price: Decimal::ONE,
            },
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
    let delete = h
        .dispatcher
        .dispatch(DeleteProduct { id }, CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(update.kind(), ErrorKind::NotFound);
    assert_eq!(delete.kind(), ErrorKind::NotFound);
    assert_eq!(h.publisher.attempt_count(), 0);
    assert_eq!(h.repository.write_count(), 0);
}

#[tokio::test]
async fn test_publish_failure_leaves_mutation_committed() {
    let h = harness();
    h.publisher.set_fail_on_publish(true);

    let err = h
        .dispatcher
        .dispatch(create("Widget"), CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeliveryFailed);
    assert!(matches!(
        &err,
        AppError::Subscriber { subscriber, .. } if subscriber == "integration-event-bridge"
    ));
    assert_eq!(h.repository.len().await, 1);
    assert_eq!(h.publisher.published_count(), 0);
    assert_eq!(h.publisher.attempt_count(), 1);

    let stored = h.repository.list(0, 10).await.unwrap();
    let found = h
        .dispatcher
        .dispatch(
            GetProductById {
                id: domain::Entity::id(&stored[0]),
            },
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(found.map(|p| p.name), Some("Widget".to_string()));
}

#[tokio::test]
async fn test_update_publish_failure_keeps_new_fields() {
    let h = harness();
    let dto = h.create("Widget").await;
    h.publisher.set_fail_on_publish(true);

    let err = h
        .dispatcher
        .dispatch(
            UpdateProduct {
                id: dto.id,
                name: "Gadget".to_string(),
                description: "Renamed".to_string(),
                price: Decimal::new(3000, 2),
            },
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeliveryFailed);
    let stored = h.repository.get_by_id(dto.id).await.unwrap().unwrap();
    assert_eq!(stored.name(), "Gadget");
    assert_eq!(stored.description(), "Renamed");
    assert_eq!(stored.price(), Decimal::new(3000, 2));
    assert!(domain::Entity::updated_at(&stored).is_some());
    assert_eq!(h.publisher.published_count(), 1);
}

#[tokio::test]
async fn test_delete_publish_failure_keeps_product_deleted() {
    let h = harness();
    let dto = h.create("Widget").await;
    h.publisher.set_fail_on_publish(true);

    let err = h
        .dispatcher
        .dispatch(DeleteProduct { id: dto.id }, CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeliveryFailed);
    assert!(h.repository.get_by_id(dto.id).await.unwrap().is_none());
    assert!(h.repository.is_empty().await);
}

/// Cancels the request's token from inside the event fan-out, after the write.
struct CancelOnEvent;

#[async_trait]
impl EventSubscriber for CancelOnEvent {
    fn name(&self) -> &str {
        "cancel-on-event"
    }

    async fn on_event(
        &self,
        _event: &ProductEvent,
        cancel: &CancellationToken,
    ) -> application::Result<()> {
        cancel.cancel();
        Ok(())
    }
}

#[tokio::test]
async fn test_cancelled_after_write_keeps_mutation_without_publishing() {
    let repository = InMemoryProductRepository::new();
    let publisher = InMemoryPublisher::new();
    let bridge = IntegrationEventBridge::new(Arc::new(publisher.clone()));
    let bus = DomainEventBus::builder()
        .subscribe_all(Arc::new(CancelOnEvent))
        .subscribe_all(Arc::new(bridge))
        .build();
    let dispatcher = product_dispatcher(Arc::new(repository.clone()), Arc::new(bus)).unwrap();

    let err = dispatcher
        .dispatch(create("Widget"), CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(repository.len().await, 1);
    assert_eq!(publisher.attempt_count(), 0);
}

#[tokio::test]
async fn test_pagination_over_dispatch() {
    let h = harness();
    for i in 0..25 {
        h.create(&format!("Product {i:02}")).await;
    }

    let first = h
        .dispatcher
        .dispatch(
            ListProducts {
                page_number: 1,
                page_size: 10,
            },
            CancellationToken::new(),
        )
        .await
        .unwrap();
    let third = h
        .dispatcher
        .dispatch(
            ListProducts {
                page_number: 3,
                page_size: 10,
            },
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(first.products.len(), 10);
    assert!(first.has_next_page);
    assert!(!first.has_previous_page);
    assert_eq!(first.products[0].name, "Product 00");

    assert_eq!(third.products.len(), 5);
    assert!(!third.has_next_page);
    assert!(third.has_previous_page);
    assert_eq!(third.products[4].name, "Product 24");
}

struct Archive;

impl Request for Archive {
    type Response = ();
    const KIND: RequestKind = RequestKind::Command;
}

#[tokio::test]
async fn test_unregistered_request_touches_no_port() {
    let h = harness();

    let err = h
        .dispatcher
        .dispatch(Archive, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Dispatch(DispatchError::NoHandlerRegistered(_))
    ));
    assert_eq!(err.kind(), ErrorKind::NoHandlerRegistered);
    assert_eq!(h.repository.write_count(), 0);
    assert_eq!(h.publisher.attempt_count(), 0);
}

#[tokio::test]
async fn test_cancelled_request_has_no_side_effects() {
    let h = harness();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = h
        .dispatcher
        .dispatch(create("Widget"), cancel)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(h.repository.is_empty().await);
    assert_eq!(h.publisher.attempt_count(), 0);
}

#[tokio::test]
async fn test_concurrent_dispatch_shares_one_dispatcher() {
    let h = Arc::new(harness());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let h = h.clone();
            tokio::spawn(async move { h.create(&format!("P{i}")).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(h.repository.len().await, 16);
    assert_eq!(h.publisher.published_count(), 16);
}
