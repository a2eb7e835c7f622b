//! HTTP handlers for products

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::ProductWithStock;

use crate::error::AppResult;
use crate::handlers::godown::GodownFilter;
use crate::middleware::CurrentUser;
use crate::services::product::{CreateProductInput, UpdateProductInput};
use crate::services::ProductService;
use crate::AppState;

/// List products with their current stock
pub async fn list_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: Result<Query<GodownFilter>, QueryRejection>,
) -> AppResult<Json<Vec<ProductWithStock>>> {
    let Query(filter) = query?;
    let service = ProductService::new(state.db);
    let products = service.list(current_user.uid(), filter.godown_id).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductWithStock>> {
    let service = ProductService::new(state.db);
    let product = service.get(current_user.uid(), product_id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: Result<Json<CreateProductInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ProductWithStock>)> {
    let Json(input) = payload?;
    let service = ProductService::new(state.db);
    let product = service.create(current_user.uid(), input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product; opening stock changes are checked against its history
pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    payload: Result<Json<UpdateProductInput>, JsonRejection>,
) -> AppResult<Json<ProductWithStock>> {
    let Json(input) = payload?;
    let service = ProductService::new(state.db);
    let product = service.update(current_user.uid(), product_id, input).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ProductService::new(state.db);
    service.delete(current_user.uid(), product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
