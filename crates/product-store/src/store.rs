use std::sync::Arc;

use async_trait::async_trait;
use domain::Product;

use crate::{ProductId, Result};

/// Core trait for product persistence.
///
/// The port carries no behavior beyond storage: validation, event raising and
/// not-found policy live in the handlers that call it. All implementations
/// must be thread-safe (Send + Sync).
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Retrieves a product by id.
    ///
    /// Returns None if no product has this id.
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    /// Retrieves up to `take` products after skipping `skip`.
    ///
    /// Products are returned in creation order (oldest first), ties broken
    /// by id so paging is stable.
    async fn list(&self, skip: u64, take: u64) -> Result<Vec<Product>>;

    /// Returns the number of stored products.
    async fn count(&self) -> Result<u64>;

    /// Stores a new product.
    ///
    /// Fails with `AlreadyExists` if the id is taken.
    async fn add(&self, product: Product) -> Result<Product>;

    /// Replaces a stored product with the given state.
    ///
    /// Fails with `NotFound` if the product is not stored.
    async fn update(&self, product: Product) -> Result<Product>;

    /// Removes a product.
    ///
    /// Returns true if a product was removed, false if none was stored.
    async fn delete(&self, id: ProductId) -> Result<bool>;
}

#[async_trait]
impl<T: ProductRepository + ?Sized> ProductRepository for Arc<T> {
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        (**self).get_by_id(id).await
    }

    async fn list(&self, skip: u64, take: u64) -> Result<Vec<Product>> {
        (**self).list(skip, take).await
    }

    async fn count(&self) -> Result<u64> {
        (**self).count().await
    }

    async fn add(&self, product: Product) -> Result<Product> {
        (**self).add(product).await
    }

    async fn update(&self, product: Product) -> Result<Product> {
        (**self).update(product).await
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        (**self).delete(id).await
    }
}
