//! HTTP handlers for godowns

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::Godown;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::godown::GodownInput;
use crate::services::GodownService;
use crate::AppState;

/// `?godownId=` filter shared by the child listings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GodownFilter {
    pub godown_id: Option<Uuid>,
}

pub async fn list_godowns(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Godown>>> {
    let service = GodownService::new(state.db);
    let godowns = service.list(current_user.uid()).await?;
    Ok(Json(godowns))
}

pub async fn get_godown(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(godown_id): Path<Uuid>,
) -> AppResult<Json<Godown>> {
    let service = GodownService::new(state.db);
    let godown = service.get(current_user.uid(), godown_id).await?;
    Ok(Json(godown))
}

/// Create a godown
pub async fn create_godown(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: Result<Json<GodownInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Godown>)> {
    let Json(input) = payload?;
    let service = GodownService::new(state.db);
    let godown = service.create(current_user.uid(), input).await?;
    Ok((StatusCode::CREATED, Json(godown)))
}

pub async fn update_godown(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(godown_id): Path<Uuid>,
    payload: Result<Json<GodownInput>, JsonRejection>,
) -> AppResult<Json<Godown>> {
    let Json(input) = payload?;
    let service = GodownService::new(state.db);
    let godown = service.update(current_user.uid(), godown_id, input).await?;
    Ok(Json(godown))
}

/// Delete a godown and everything stocked in it
pub async fn delete_godown(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(godown_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = GodownService::new(state.db);
    service.delete(current_user.uid(), godown_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
