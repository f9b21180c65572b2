//! Product queries and their handlers. Queries never mutate state.

use std::sync::Arc;

use async_trait::async_trait;
use common::ProductId;
use product_store::ProductRepository;
use tokio_util::sync::CancellationToken;

use crate::cancel::cancellable;
use crate::dispatcher::{Request, RequestHandler, RequestKind};
use crate::dto::{PagedResult, ProductDto};
use crate::error::{AppError, Result};

pub const DEFAULT_PAGE_NUMBER: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Looks up one product. An absent product is `None`, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetProductById {
    pub id: ProductId,
}

impl Request for GetProductById {
    type Response = Option<ProductDto>;
    const KIND: RequestKind = RequestKind::Query;
}

/// Fetches one page of products in creation order.
///
/// Both values are 1-based and must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListProducts {
    pub page_number: i64,
    pub page_size: i64,
}

impl Default for ListProducts {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Request for ListProducts {
    type Response = PagedResult;
    const KIND: RequestKind = RequestKind::Query;
}

/// Validated paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Page {
    number: u64,
    size: u64,
    skip: u64,
}

impl Page {
    fn try_from_request(request: &ListProducts) -> Result<Self> {
        let number = u64::try_from(request.page_number)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| {
                AppError::InvalidArgument(format!(
                    "page number must be at least 1, got {}",
                    request.page_number
                ))
            })?;
        let size = u64::try_from(request.page_size)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| {
                AppError::InvalidArgument(format!(
                    "page size must be at least 1, got {}",
                    request.page_size
                ))
            })?;
        let skip = (number - 1).checked_mul(size).ok_or_else(|| {
            AppError::InvalidArgument(format!(
                "page {number} of size {size} is out of range"
            ))
        })?;

        Ok(Self { number, size, skip })
    }
}

pub struct GetProductByIdHandler {
    repository: Arc<dyn ProductRepository>,
}

impl GetProductByIdHandler {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl RequestHandler<GetProductById> for GetProductByIdHandler {
    #[tracing::instrument(skip_all, fields(product_id = %request.id))]
    async fn handle(
        &self,
        request: GetProductById,
        cancel: CancellationToken,
    ) -> Result<Option<ProductDto>> {
        let product = cancellable(&cancel, self.repository.get_by_id(request.id)).await?;
        if product.is_none() {
            tracing::debug!("Product not found");
        }
        Ok(product.as_ref().map(ProductDto::from))
    }
}

pub struct ListProductsHandler {
    repository: Arc<dyn ProductRepository>,
}

impl ListProductsHandler {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl RequestHandler<ListProducts> for ListProductsHandler {
    #[tracing::instrument(
        skip_all,
        fields(page_number = request.page_number, page_size = request.page_size)
    )]
    async fn handle(
        &self,
        request: ListProducts,
        cancel: CancellationToken,
    ) -> Result<PagedResult> {
        let page = Page::try_from_request(&request)?;

        let products = cancellable(&cancel, self.repository.list(page.skip, page.size)).await?;
        let total_count = cancellable(&cancel, self.repository.count()).await?;

        let has_next_page = page
            .skip
            .checked_add(page.size)
            .is_some_and(|end| end < total_count);

        tracing::info!(
            returned = products.len(),
            total_count,
            "Retrieved products page"
        );

        Ok(PagedResult {
            products: products.iter().map(ProductDto::from).collect(),
            total_count,
            page_number: page.number,
            page_size: page.size,
            has_next_page,
            has_previous_page: page.number > 1,
        })
    }
}
