//! Data transfer objects returned by handlers.

use chrono::{DateTime, Utc};
use common::ProductId;
use domain::{Entity, Product};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// External representation of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            price: product.price(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
        }
    }
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult {
    pub products: Vec<ProductDto>,
    pub total_count: u64,
    pub page_number: u64,
    pub page_size: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}
