//! Handlers for the product catalogue.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::pagination::{Paginated, PaginationParams};
use crate::api::dto::product::{
    ProductRequest, ProductResponse, ProductSearchParams, StockAdjustmentRequest,
};
use crate::error::AppError;
use crate::state::AppState;

/// # Endpoint
///
/// `GET /api/v1/products?page=1&page_size=10`
pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<ProductResponse>>, AppError> {
    let page = params
        .resolve()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (products, total) = state
        .product_service
        .list(page.offset(), page.limit())
        .await?;

    Ok(Json(Paginated::new(
        products.into_iter().map(ProductResponse::from).collect(),
        total,
        page,
    )))
}

/// # Endpoint
///
/// `GET /api/v1/products/{id}`
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, AppError> {
    Ok(Json(state.product_service.get(id).await?.into()))
}

/// Searches names and descriptions.
///
/// # Endpoint
///
/// `GET /api/v1/products/search?search_term=widget`
pub async fn search_products_handler(
    State(state): State<AppState>,
    Query(params): Query<ProductSearchParams>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    params.validate()?;

    let products = state.product_service.search(&params.search_term).await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// # Endpoint
///
/// `GET /api/v1/products/category/{category}`
pub async fn products_by_category_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.product_service.by_category(&category).await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Adds a product to the catalogue.
///
/// # Endpoint
///
/// `POST /api/v1/products` (Admin)
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
pub async fn create_product_handler(
    State(state): State<AppState>,
    Json(payload): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    payload.validate()?;

    let product = state.product_service.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Replaces a product's editable fields.
///
/// # Endpoint
///
/// `PUT /api/v1/products/{id}` (Admin)
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    payload.validate()?;

    let product = state.product_service.update(id, payload.into()).await?;
    Ok(Json(product.into()))
}

/// # Endpoint
///
/// `DELETE /api/v1/products/{id}` (Admin)
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.product_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adds to or removes from stock.
///
/// # Endpoint
///
/// `PATCH /api/v1/products/{id}/stock` (Admin)
///
/// # Errors
///
/// Returns 400 Bad Request if the stock would become negative.
pub async fn adjust_stock_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockAdjustmentRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .product_service
        .adjust_stock(id, payload.quantity)
        .await?;
    Ok(Json(product.into()))
}
