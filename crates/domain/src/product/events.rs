//! Product domain events.

use chrono::{DateTime, Utc};
use common::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{DomainEvent, Entity, timestamp_now};

use super::Product;

/// Events raised by successful product mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    /// Product was created.
    ProductCreated(ProductCreatedData),

    /// Product name, description or price changed.
    ProductUpdated(ProductUpdatedData),

    /// Product was removed from the catalog.
    ProductDeleted(ProductDeletedData),
}

/// Discriminant of [`ProductEvent`], used for subscriber routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductEventKind {
    Created,
    Updated,
    Deleted,
}

impl ProductEventKind {
    pub const ALL: [ProductEventKind; 3] = [
        ProductEventKind::Created,
        ProductEventKind::Updated,
        ProductEventKind::Deleted,
    ];
}

impl std::fmt::Display for ProductEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProductEventKind::Created => "Created",
            ProductEventKind::Updated => "Updated",
            ProductEventKind::Deleted => "Deleted",
        };
        write!(f, "{s}")
    }
}

impl ProductEvent {
    /// Builds the creation event from a freshly persisted product.
    pub fn created(product: &Product) -> Self {
        ProductEvent::ProductCreated(ProductCreatedData {
            product_id: product.id(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            price: product.price(),
            created_at: product.created_at(),
        })
    }

    /// Builds the update event from the post-update product state.
    pub fn updated(product: &Product) -> Self {
        ProductEvent::ProductUpdated(ProductUpdatedData {
            product_id: product.id(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            price: product.price(),
            updated_at: product.updated_at().unwrap_or_else(timestamp_now),
        })
    }

    /// Builds the deletion event, stamped with the current time.
    pub fn deleted(product_id: ProductId) -> Self {
        ProductEvent::ProductDeleted(ProductDeletedData {
            product_id,
            deleted_at: timestamp_now(),
        })
    }

    pub fn kind(&self) -> ProductEventKind {
        match self {
            ProductEvent::ProductCreated(_) => ProductEventKind::Created,
            ProductEvent::ProductUpdated(_) => ProductEventKind::Updated,
            ProductEvent::ProductDeleted(_) => ProductEventKind::Deleted,
        }
    }
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "ProductCreated",
            ProductEvent::ProductUpdated(_) => "ProductUpdated",
            ProductEvent::ProductDeleted(_) => "ProductDeleted",
        }
    }

    fn aggregate_id(&self) -> ProductId {
        match self {
            ProductEvent::ProductCreated(data) => data.product_id,
            ProductEvent::ProductUpdated(data) => data.product_id,
            ProductEvent::ProductDeleted(data) => data.product_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(data) => data.created_at,
            ProductEvent::ProductUpdated(data) => data.updated_at,
            ProductEvent::ProductDeleted(data) => data.deleted_at,
        }
    }
}

/// Data for ProductCreated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreatedData {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Data for ProductUpdated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdatedData {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Data for ProductDeleted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeletedData {
    pub product_id: ProductId,
    pub deleted_at: DateTime<Utc>,
}
