//! Integration events: the broker-facing form of product changes.

use chrono::{DateTime, Utc};
use common::{EventId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exchange product integration events are published to.
pub const PRODUCT_EXCHANGE: &str = "product.events";

pub const PRODUCT_CREATED_ROUTING_KEY: &str = "product.created";
pub const PRODUCT_UPDATED_ROUTING_KEY: &str = "product.updated";
pub const PRODUCT_DELETED_ROUTING_KEY: &str = "product.deleted";

/// A uniquely identified message describing one product change.
///
/// Serialized flat with PascalCase keys, so a created event reads
/// `{"ProductId": .., "Name": .., ..., "EventId": .., "EventTime": ..}`.
/// Every emission gets its own `event_id`; integration events are never
/// stored or re-sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IntegrationEvent {
    #[serde(flatten)]
    pub payload: IntegrationPayload,
    pub event_id: EventId,
    pub event_time: DateTime<Utc>,
}

/// The change-specific part of an [`IntegrationEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntegrationPayload {
    #[serde(rename_all = "PascalCase")]
    ProductCreated {
        product_id: ProductId,
        name: String,
        description: String,
        #[serde(with = "rust_decimal::serde::float")]
        price: Decimal,
        created_at: DateTime<Utc>,
    },

    #[serde(rename_all = "PascalCase")]
    ProductUpdated {
        product_id: ProductId,
        name: String,
        description: String,
        #[serde(with = "rust_decimal::serde::float")]
        price: Decimal,
        updated_at: DateTime<Utc>,
    },

    #[serde(rename_all = "PascalCase")]
    ProductDeleted {
        product_id: ProductId,
        deleted_at: DateTime<Utc>,
    },
}

impl IntegrationEvent {
    /// Wraps a payload with a fresh event id stamped at `event_time`.
    pub fn new(payload: IntegrationPayload, event_time: DateTime<Utc>) -> Self {
        Self {
            payload,
            event_id: EventId::new(),
            event_time,
        }
    }

    pub fn product_id(&self) -> ProductId {
        match &self.payload {
            IntegrationPayload::ProductCreated { product_id, .. }
            | IntegrationPayload::ProductUpdated { product_id, .. }
            | IntegrationPayload::ProductDeleted { product_id, .. } => *product_id,
        }
    }

    /// Routing key for this event on the product exchange.
    pub fn routing_key(&self) -> &'static str {
        match self.payload {
            IntegrationPayload::ProductCreated { .. } => PRODUCT_CREATED_ROUTING_KEY,
            IntegrationPayload::ProductUpdated { .. } => PRODUCT_UPDATED_ROUTING_KEY,
            IntegrationPayload::ProductDeleted { .. } => PRODUCT_DELETED_ROUTING_KEY,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self.payload {
            IntegrationPayload::ProductCreated { .. } => "ProductCreatedIntegrationEvent",
            IntegrationPayload::ProductUpdated { .. } => "ProductUpdatedIntegrationEvent",
            IntegrationPayload::ProductDeleted { .. } => "ProductDeletedIntegrationEvent",
        }
    }
}
