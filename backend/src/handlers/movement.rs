//! HTTP handlers for the stock movement ledger

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::{MovementDraft, StockMovement};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::movement::CreateMovementInput;
use crate::services::MovementService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementListQuery {
    pub product_id: Option<Uuid>,
}

/// List a product's movements in ledger order
pub async fn list_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: Result<Query<MovementListQuery>, QueryRejection>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let Query(query) = query?;
    let product_id = query
        .product_id
        .ok_or_else(|| AppError::invalid("productId", "productId is required"))?;

    let service = MovementService::new(state.db);
    let movements = service.list(current_user.uid(), product_id).await?;
    Ok(Json(movements))
}

/// Record a stock movement
pub async fn create_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: Result<Json<CreateMovementInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    let Json(input) = payload?;
    let service = MovementService::new(state.db);
    let movement = service.create(current_user.uid(), input).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Edit a recorded movement
pub async fn update_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(movement_id): Path<Uuid>,
    payload: Result<Json<MovementDraft>, JsonRejection>,
) -> AppResult<Json<StockMovement>> {
    let Json(draft) = payload?;
    let service = MovementService::new(state.db);
    let movement = service
        .update(current_user.uid(), movement_id, draft)
        .await?;
    Ok(Json(movement))
}

pub async fn delete_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(movement_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = MovementService::new(state.db);
    service.delete(current_user.uid(), movement_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
