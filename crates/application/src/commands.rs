//! Product commands and their handlers.
//!
//! Every command handler follows the same sequence: check preconditions,
//! perform exactly one persistence mutation, then notify subscribers of the
//! resulting domain event. A failure before the mutation leaves no trace. A
//! subscriber failure after it is returned to the caller while the mutation
//! stays committed.

use std::sync::Arc;

use async_trait::async_trait;
use common::ProductId;
use domain::{Entity, Product, ProductDetails, ProductEvent};
use product_store::ProductRepository;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::cancel::cancellable;
use crate::dispatcher::{Request, RequestHandler, RequestKind};
use crate::dto::ProductDto;
use crate::error::{AppError, Result};
use crate::event_bus::EventNotifier;

/// Creates a new product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

impl Request for CreateProduct {
    type Response = ProductDto;
    const KIND: RequestKind = RequestKind::Command;
}

/// Replaces name, description and price of an existing product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProduct {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

impl Request for UpdateProduct {
    type Response = ProductDto;
    const KIND: RequestKind = RequestKind::Command;
}

/// Removes a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteProduct {
    pub id: ProductId,
}

impl Request for DeleteProduct {
    type Response = bool;
    const KIND: RequestKind = RequestKind::Command;
}

pub struct CreateProductHandler {
    repository: Arc<dyn ProductRepository>,
    events: Arc<dyn EventNotifier>,
}

impl CreateProductHandler {
    pub fn new(repository: Arc<dyn ProductRepository>, events: Arc<dyn EventNotifier>) -> Self {
        Self { repository, events }
    }
}

#[async_trait]
impl RequestHandler<CreateProduct> for CreateProductHandler {
    #[tracing::instrument(skip_all, fields(name = %request.name))]
    async fn handle(
        &self,
        request: CreateProduct,
        cancel: CancellationToken,
    ) -> Result<ProductDto> {
        tracing::info!("Creating product");

        let product = Product::create(request.name, request.description, request.price)?;
        let product = cancellable(&cancel, self.repository.add(product)).await?;

        self.events
            .notify(&ProductEvent::created(&product), &cancel)
            .await?;

        tracing::info!(product_id = %product.id(), "Product created");
        Ok(ProductDto::from(&product))
    }
}

pub struct UpdateProductHandler {
    repository: Arc<dyn ProductRepository>,
    events: Arc<dyn EventNotifier>,
}

impl UpdateProductHandler {
    pub fn new(repository: Arc<dyn ProductRepository>, events: Arc<dyn EventNotifier>) -> Self {
        Self { repository, events }
    }
}

#[async_trait]
impl RequestHandler<UpdateProduct> for UpdateProductHandler {
    #[tracing::instrument(skip_all, fields(product_id = %request.id))]
    async fn handle(
        &self,
        request: UpdateProduct,
        cancel: CancellationToken,
    ) -> Result<ProductDto> {
        tracing::info!("Updating product");

        let details = ProductDetails::new(request.name, request.description, request.price)?;

        let Some(mut product) = cancellable(&cancel, self.repository.get_by_id(request.id)).await?
        else {
            tracing::warn!("Product not found");
            return Err(AppError::NotFound(request.id));
        };

        product.apply(details);
        let product = cancellable(&cancel, self.repository.update(product)).await?;

        self.events
            .notify(&ProductEvent::updated(&product), &cancel)
            .await?;

        tracing::info!("Product updated");
        Ok(ProductDto::from(&product))
    }
}

pub struct DeleteProductHandler {
    repository: Arc<dyn ProductRepository>,
    events: Arc<dyn EventNotifier>,
}

impl DeleteProductHandler {
    pub fn new(repository: Arc<dyn ProductRepository>, events: Arc<dyn EventNotifier>) -> Self {
        Self { repository, events }
    }
}

#[async_trait]
impl RequestHandler<DeleteProduct> for DeleteProductHandler {
    #[tracing::instrument(skip_all, fields(product_id = %request.id))]
    async fn handle(&self, request: DeleteProduct, cancel: CancellationToken) -> Result<bool> {
        tracing::info!("Deleting product");

        let existing = cancellable(&cancel, self.repository.get_by_id(request.id)).await?;
        if existing.is_none() {
            tracing::warn!("Product not found");
            return Err(AppError::NotFound(request.id));
        }

        // A concurrent delete may win between the lookup and here.
        if !cancellable(&cancel, self.repository.delete(request.id)).await? {
            tracing::warn!("Product disappeared before delete");
            return Err(AppError::NotFound(request.id));
        }

        self.events
            .notify(&ProductEvent::deleted(request.id), &cancel)
            .await?;

        tracing::info!("Product deleted");
        Ok(true)
    }
}
