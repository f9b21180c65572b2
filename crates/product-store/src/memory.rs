use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use domain::{Entity, Product};
use tokio::sync::RwLock;

use crate::{ProductId, RepositoryError, Result, store::ProductRepository};

/// In-memory product store.
///
/// Provides the same interface as the PostgreSQL implementation. Clones share
/// storage, so a test can keep a handle while the pipeline owns another.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    fail_on_write: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryProductRepository {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to reject every add, update and delete.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of add, update and delete calls received,
    /// including rejected ones.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns the total number of products stored.
    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    /// Returns true if no products are stored.
    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }

    /// Clears all products.
    pub async fn clear(&self) {
        self.products.write().await.clear();
    }

    fn begin_write(&self) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "writes are disabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn list(&self, skip: u64, take: u64) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut all: Vec<_> = products.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then(a.id().cmp(&b.id()))
        });

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let take = usize::try_from(take).unwrap_or(usize::MAX);
        Ok(all.into_iter().skip(skip).take(take).collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.products.read().await.len() as u64)
    }

    async fn add(&self, product: Product) -> Result<Product> {
        self.begin_write()?;
        let mut products = self.products.write().await;

        let id = product.id();
        if products.contains_key(&id) {
            return Err(RepositoryError::AlreadyExists(id));
        }
        products.insert(id, product.clone());
        tracing::debug!(product_id = %id, "product added");

        Ok(product)
    }

    async fn update(&self, product: Product) -> Result<Product> {
        self.begin_write()?;
        let mut products = self.products.write().await;

        let id = product.id();
        match products.get_mut(&id) {
            Some(stored) => {
                *stored = product.clone();
                tracing::debug!(product_id = %id, "product updated");
                Ok(product)
            }
            None => Err(RepositoryError::NotFound(id)),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        self.begin_write()?;
        let removed = self.products.write().await.remove(&id).is_some();
        tracing::debug!(product_id = %id, removed, "product delete");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(name: &str) -> Product {
        Product::create(name, "A test product", Decimal::new(1000, 2)).unwrap()
    }

    #[tokio::test]
    async fn add_and_get_product() {
        let store = InMemoryProductRepository::new();
        let widget = product("Widget");
        let id = widget.id();

        store.add(widget.clone()).await.unwrap();

        let loaded = store.get_by_id(id).await.unwrap();
        assert_eq!(loaded, Some(widget));
    }

    #[tokio::test]
    async fn get_missing_product_returns_none() {
        let store = InMemoryProductRepository::new();
        assert!(store.get_by_id(ProductId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_duplicate_id_fails() {
        let store = InMemoryProductRepository::new();
        let widget = product("Widget");

        store.add(widget.clone()).await.unwrap();
        let result = store.add(widget).await;

        assert!(matches!(result, Err(RepositoryError::AlreadyExists(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_replaces_stored_state() {
        let store = InMemoryProductRepository::new();
        let mut widget = store.add(product("Widget")).await.unwrap();

        widget
            .update("Gadget", "Renamed", Decimal::new(500, 2))
            .unwrap();
        store.update(widget.clone()).await.unwrap();

        let loaded = store.get_by_id(widget.id()).await.unwrap().unwrap();
        assert_eq!(loaded.name(), "Gadget");
        assert!(loaded.updated_at().is_some());
    }

    #[tokio::test]
    async fn update_missing_product_fails() {
        let store = InMemoryProductRepository::new();
        let result = store.update(product("Ghost")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_reports_whether_removed() {
        let store = InMemoryProductRepository::new();
        let widget = store.add(product("Widget")).await.unwrap();

        assert!(store.delete(widget.id()).await.unwrap());
        assert!(!store.delete(widget.id()).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn list_orders_by_creation_time_and_pages() {
        let store = InMemoryProductRepository::new();
        for i in 0..5 {
            store.add(product(&format!("P{i}"))).await.unwrap();
        }

        let all = store.list(0, 100).await.unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.windows(2).all(|w| {
            (w[0].created_at(), w[0].id()) <= (w[1].created_at(), w[1].id())
        }));

        let page = store.list(2, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id(), all[2].id());
        assert_eq!(page[1].id(), all[3].id());

        let tail = store.list(4, 10).await.unwrap();
        assert_eq!(tail.len(), 1);

        assert_eq!(store.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn fail_on_write_rejects_mutations_and_counts_them() {
        let store = InMemoryProductRepository::new();
        store.set_fail_on_write(true);

        let result = store.add(product("Widget")).await;

        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
        assert_eq!(store.write_count(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let store = InMemoryProductRepository::new();
        let handle = store.clone();

        store.add(product("Widget")).await.unwrap();

        assert_eq!(handle.len().await, 1);
    }
}
