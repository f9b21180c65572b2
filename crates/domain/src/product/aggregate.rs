//! Product aggregate implementation.

use chrono::{DateTime, Utc};
use common::ProductId;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::{Entity, timestamp_now};
use crate::error::ProductError;

use super::ProductDetails;

/// A catalog product.
///
/// The product enforces these invariants:
/// - `id` and `created_at` never change after creation
/// - `updated_at` is `None` until the first update, then never moves backwards
/// - name, description and price always satisfy [`ProductDetails`] rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    id: ProductId,
    details: ProductDetails,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Creates a new product with a freshly generated identity.
    pub fn create(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
    ) -> Result<Self, ProductError> {
        let details = ProductDetails::new(name, description, price)?;
        Ok(Self {
            id: ProductId::new(),
            details,
            created_at: timestamp_now(),
            updated_at: None,
        })
    }

    /// Rebuilds a product from stored state.
    ///
    /// Used by repositories; the stored fields were validated when written.
    pub fn restore(
        id: ProductId,
        details: ProductDetails,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            details,
            created_at,
            updated_at,
        }
    }

    /// Replaces name, description and price.
    ///
    /// On a validation failure the product is left untouched.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
    ) -> Result<(), ProductError> {
        let details = ProductDetails::new(name, description, price)?;
        self.apply(details);
        Ok(())
    }

    /// Replaces name, description and price with already validated details.
    pub fn apply(&mut self, details: ProductDetails) {
        self.details = details;
        let previous = self.updated_at.unwrap_or(self.created_at);
        self.updated_at = Some(timestamp_now().max(previous));
    }

    pub fn name(&self) -> &str {
        self.details.name()
    }

    pub fn description(&self) -> &str {
        self.details.description()
    }

    pub fn price(&self) -> Decimal {
        self.details.price()
    }

    pub fn details(&self) -> &ProductDetails {
        &self.details
    }
}

impl Entity for Product {
    fn id(&self) -> ProductId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
