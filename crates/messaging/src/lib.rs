//! Outbound messaging for product changes.
//!
//! Domain events are translated into [`IntegrationEvent`]s, each carrying a
//! fresh event id and emission time, and handed to a [`MessagePublisher`].
//!
//! Publishers:
//! - [`AmqpPublisher`]: RabbitMQ (or any AMQP 0.9.1 broker) with publisher confirms
//! - [`NoOpPublisher`]: logs what would be sent
//! - [`InMemoryPublisher`]: records messages for tests

pub mod amqp;
pub mod error;
pub mod integration;
pub mod memory;
pub mod noop;
pub mod publisher;
pub mod translator;

pub use amqp::AmqpPublisher;
pub use error::PublishError;
pub use integration::{
    IntegrationEvent, IntegrationPayload, PRODUCT_CREATED_ROUTING_KEY,
    PRODUCT_DELETED_ROUTING_KEY, PRODUCT_EXCHANGE, PRODUCT_UPDATED_ROUTING_KEY,
};
pub use memory::{InMemoryPublisher, PublishedMessage};
pub use noop::NoOpPublisher;
pub use publisher::MessagePublisher;
pub use translator::translate;
