//! Assembles the product dispatcher from its ports.

use std::sync::Arc;

use domain::ProductEventKind;
use messaging::MessagePublisher;
use product_store::ProductRepository;

use crate::bridge::IntegrationEventBridge;
use crate::commands::{
    CreateProduct, CreateProductHandler, DeleteProduct, DeleteProductHandler, UpdateProduct,
    UpdateProductHandler,
};
use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::event_bus::{DomainEventBus, EventNotifier};
use crate::queries::{GetProductById, GetProductByIdHandler, ListProducts, ListProductsHandler};

/// Builds an event bus whose only subscriber forwards every product event to
/// `publisher` on `exchange`.
pub fn integration_event_bus(
    publisher: Arc<dyn MessagePublisher>,
    exchange: impl Into<String>,
) -> DomainEventBus {
    let bridge = Arc::new(IntegrationEventBridge::with_exchange(publisher, exchange));
    ProductEventKind::ALL
        .into_iter()
        .fold(DomainEventBus::builder(), |builder, kind| {
            builder.subscribe(kind, bridge.clone())
        })
        .build()
}

/// Registers one handler for each product command and query.
pub fn product_dispatcher(
    repository: Arc<dyn ProductRepository>,
    events: Arc<dyn EventNotifier>,
) -> Result<Dispatcher, DispatchError> {
    Dispatcher::builder()
        .register::<CreateProduct, _>(CreateProductHandler::new(
            repository.clone(),
            events.clone(),
        ))
        .register::<UpdateProduct, _>(UpdateProductHandler::new(
            repository.clone(),
            events.clone(),
        ))
        .register::<DeleteProduct, _>(DeleteProductHandler::new(repository.clone(), events))
        .register::<GetProductById, _>(GetProductByIdHandler::new(repository.clone()))
        .register::<ListProducts, _>(ListProductsHandler::new(repository))
        .build()
}
