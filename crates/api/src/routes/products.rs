//! Product CRUD endpoints.

use std::sync::Arc;
use std::time::Duration;

use application::{
    AppError, CancellationToken, CreateProduct, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE,
    DeleteProduct, Dispatcher, GetProductById, ListProducts, PagedResult, ProductDto, Request,
    UpdateProduct,
};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::ProductId;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub request_timeout: Duration,
}

impl AppState {
    /// Dispatches `request`, cancelling it once the request timeout elapses.
    pub async fn dispatch<R: Request>(&self, request: R) -> Result<R::Response, AppError> {
        let cancel = CancellationToken::new();
        let dispatch = self.dispatcher.dispatch(request, cancel.clone());
        tokio::pin!(dispatch);

        tokio::select! {
            result = &mut dispatch => result,
            () = tokio::time::sleep(self.request_timeout) => {
                tracing::warn!(timeout = ?self.request_timeout, "request timed out, cancelling");
                cancel.cancel();
                dispatch.await
            }
        }
    }
}

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

fn parse_id(raw: &str) -> Result<ProductId, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid product id: {e}")))
}

fn json_body(
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<ProductRequest, ApiError> {
    body.map(|Json(req)| req)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

// -- Handlers --

/// POST /api/products — create a product.
#[tracing::instrument(skip(state, body))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req = json_body(body)?;
    let product = state
        .dispatch(CreateProduct {
            name: req.name,
            description: req.description,
            price: req.price,
        })
        .await?;

    let location = format!("/api/products/{}", product.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(product),
    )
        .into_response())
}

/// GET /api/products/{id} — fetch one product.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductDto>, ApiError> {
    let id = parse_id(&id)?;
    state
        .dispatch(GetProductById { id })
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product with ID {id} not found")))
}

/// GET /api/products — list one page of products.
#[tracing::instrument(skip(state, params))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PagedResult>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let page = state
        .dispatch(ListProducts {
            page_number: params.page_number.unwrap_or(DEFAULT_PAGE_NUMBER),
            page_size: params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        })
        .await?;
    Ok(Json(page))
}

/// PUT /api/products/{id} — replace name, description and price.
#[tracing::instrument(skip(state, body))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<ProductDto>, ApiError> {
    let id = parse_id(&id)?;
    let req = json_body(body)?;
    let product = state
        .dispatch(UpdateProduct {
            id,
            name: req.name,
            description: req.description,
            price: req.price,
        })
        .await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} — remove a product.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.dispatch(DeleteProduct { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
