//! HTTP handlers for unit types

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::UnitType;

use crate::error::AppResult;
use crate::handlers::godown::GodownFilter;
use crate::middleware::CurrentUser;
use crate::services::unit_type::{CreateUnitTypeInput, UpdateUnitTypeInput};
use crate::services::UnitTypeService;
use crate::AppState;

/// Unit types of all godowns, or of `?godownId=`
pub async fn list_unit_types(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: Result<Query<GodownFilter>, QueryRejection>,
) -> AppResult<Json<Vec<UnitType>>> {
    let Query(filter) = query?;
    let service = UnitTypeService::new(state.db);
    let unit_types = service.list(current_user.uid(), filter.godown_id).await?;
    Ok(Json(unit_types))
}

pub async fn get_unit_type(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(unit_type_id): Path<Uuid>,
) -> AppResult<Json<UnitType>> {
    let service = UnitTypeService::new(state.db);
    let unit_type = service.get(current_user.uid(), unit_type_id).await?;
    Ok(Json(unit_type))
}

pub async fn create_unit_type(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: Result<Json<CreateUnitTypeInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UnitType>)> {
    let Json(input) = payload?;
    let service = UnitTypeService::new(state.db);
    let unit_type = service.create(current_user.uid(), input).await?;
    Ok((StatusCode::CREATED, Json(unit_type)))
}

pub async fn update_unit_type(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(unit_type_id): Path<Uuid>,
    payload: Result<Json<UpdateUnitTypeInput>, JsonRejection>,
) -> AppResult<Json<UnitType>> {
    let Json(input) = payload?;
    let service = UnitTypeService::new(state.db);
    let unit_type = service
        .update(current_user.uid(), unit_type_id, input)
        .await?;
    Ok(Json(unit_type))
}

pub async fn delete_unit_type(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(unit_type_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = UnitTypeService::new(state.db);
    service.delete(current_user.uid(), unit_type_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
