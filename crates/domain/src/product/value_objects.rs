//! Value objects for the product domain.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{ProductError, ValidationErrors};

/// Maximum product name length, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum product description length, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Highest accepted price (inclusive).
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// The mutable, validated fields of a product.
///
/// Both creation and update go through [`ProductDetails::new`], so a product
/// can never hold a name, description or price that breaks the field rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetails {
    name: String,
    description: String,
    price: Decimal,
}

impl ProductDetails {
    /// Validates the raw fields, collecting every violation.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
    ) -> Result<Self, ProductError> {
        let name = name.into();
        let description = description.into();
        let mut errors = ValidationErrors::new();

        if name.trim().is_empty() {
            errors.push("name", "Product name is required");
        } else if name.chars().count() > MAX_NAME_LENGTH {
            errors.push(
                "name",
                format!("Product name cannot exceed {MAX_NAME_LENGTH} characters"),
            );
        }

        if description.trim().is_empty() {
            errors.push("description", "Product description is required");
        } else if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            errors.push(
                "description",
                format!("Product description cannot exceed {MAX_DESCRIPTION_LENGTH} characters"),
            );
        }

        if price <= Decimal::ZERO {
            errors.push("price", "Product price must be greater than 0");
        } else if price > MAX_PRICE {
            errors.push("price", "Product price cannot exceed 1,000,000");
        }

        if errors.is_empty() {
            Ok(Self {
                name,
                description,
                price,
            })
        } else {
            Err(ProductError::Validation(errors))
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Decimal {
        self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_valid_details() {
        let details = ProductDetails::new("Widget", "A useful widget", price(1999)).unwrap();
        assert_eq!(details.name(), "Widget");
        assert_eq!(details.description(), "A useful widget");
        assert_eq!(details.price(), price(1999));
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let ProductError::Validation(errors) =
            ProductDetails::new("   ", "", price(100)).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("name"));
        assert!(errors.has_field("description"));
    }

    #[test]
    fn test_length_limits_are_inclusive() {
        let name = "n".repeat(MAX_NAME_LENGTH);
        let description = "d".repeat(MAX_DESCRIPTION_LENGTH);
        assert!(ProductDetails::new(name, description, price(100)).is_ok());

        let ProductError::Validation(errors) = ProductDetails::new(
            "n".repeat(MAX_NAME_LENGTH + 1),
            "d".repeat(MAX_DESCRIPTION_LENGTH + 1),
            price(100),
        )
        .unwrap_err();
        assert!(errors.has_field("name"));
        assert!(errors.has_field("description"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let name = "é".repeat(MAX_NAME_LENGTH);
        assert!(ProductDetails::new(name, "ok", price(100)).is_ok());
    }

    #[test]
    fn test_price_bounds() {
        assert!(ProductDetails::new("a", "b", Decimal::ZERO).is_err());
        assert!(ProductDetails::new("a", "b", price(-1)).is_err());
        assert!(ProductDetails::new("a", "b", price(1)).is_ok());
        assert!(ProductDetails::new("a", "b", MAX_PRICE).is_ok());

        let ProductError::Validation(errors) =
            ProductDetails::new("a", "b", MAX_PRICE + price(1)).unwrap_err();
        assert!(errors.has_field("price"));
    }

    #[test]
    fn test_max_price_constant() {
        assert_eq!(MAX_PRICE, Decimal::from(1_000_000));
    }
}
