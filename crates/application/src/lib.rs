//! Product catalog application layer.
//!
//! Incoming intents are dispatched to exactly one handler. Command handlers
//! mutate the [`ProductRepository`](product_store::ProductRepository) once and
//! then notify the [`EventNotifier`], whose default implementation forwards
//! each domain event to the message broker through an
//! [`IntegrationEventBridge`].

pub mod bridge;
pub mod cancel;
pub mod commands;
pub mod dispatcher;
pub mod dto;
pub mod error;
pub mod event_bus;
pub mod queries;
pub mod wiring;

pub use bridge::IntegrationEventBridge;
pub use commands::{
    CreateProduct, CreateProductHandler, DeleteProduct, DeleteProductHandler, UpdateProduct,
    UpdateProductHandler,
};
pub use dispatcher::{Dispatcher, DispatcherBuilder, Request, RequestHandler, RequestKind};
pub use dto::{PagedResult, ProductDto};
pub use error::{AppError, DispatchError, ErrorKind, Result};
pub use event_bus::{DomainEventBus, DomainEventBusBuilder, EventNotifier, EventSubscriber};
pub use queries::{
    DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, GetProductById, GetProductByIdHandler, ListProducts,
    ListProductsHandler,
};
pub use tokio_util::sync::CancellationToken;
pub use wiring::{integration_event_bus, product_dispatcher};
