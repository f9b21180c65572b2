//! Domain layer for the product catalog.
//!
//! This crate provides the core domain abstractions including:
//! - `Entity` and `DomainEvent` traits
//! - the `Product` aggregate with its validation rules
//! - `ProductEvent`, the domain events raised by successful mutations

pub mod aggregate;
pub mod error;
pub mod product;

pub use aggregate::{DomainEvent, Entity, timestamp_now};
pub use common::ProductId;
pub use error::{FieldError, ProductError, ValidationErrors};
pub use product::{
    MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_PRICE, Product, ProductCreatedData,
    ProductDeletedData, ProductDetails, ProductEvent, ProductEventKind, ProductUpdatedData,
};
