use thiserror::Error;

use crate::ProductId;

/// Errors that can occur when interacting with the product store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An update targeted a product that is not stored.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// An insert reused the identity of a stored product.
    #[error("Product already exists: {0}")]
    AlreadyExists(ProductId),

    /// A stored row no longer satisfies the product rules.
    #[error("Invalid stored product {id}: {reason}")]
    InvalidRow { id: ProductId, reason: String },

    /// The backend refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for product store operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
