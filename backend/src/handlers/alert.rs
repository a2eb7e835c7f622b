//! HTTP handlers for alert thresholds and evaluated alerts

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use uuid::Uuid;

use shared::{AlertSettings, StockAlert};

use crate::error::{AppError, AppResult};
use crate::handlers::godown::GodownFilter;
use crate::middleware::CurrentUser;
use crate::services::AlertService;
use crate::AppState;

fn required_godown(filter: &GodownFilter) -> AppResult<Uuid> {
    filter
        .godown_id
        .ok_or_else(|| AppError::invalid("godownId", "godownId is required"))
}

/// Thresholds of a godown (defaults when never saved)
pub async fn get_alert_settings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: Result<Query<GodownFilter>, QueryRejection>,
) -> AppResult<Json<AlertSettings>> {
    let Query(filter) = query?;
    let godown_id = required_godown(&filter)?;

    let service = AlertService::new(state.db);
    let settings = service.get_settings(current_user.uid(), godown_id).await?;
    Ok(Json(settings))
}

/// Replace the thresholds of a godown
pub async fn save_alert_settings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: Result<Query<GodownFilter>, QueryRejection>,
    payload: Result<Json<AlertSettings>, JsonRejection>,
) -> AppResult<Json<AlertSettings>> {
    let Query(filter) = query?;
    let godown_id = required_godown(&filter)?;
    let Json(settings) = payload?;

    let service = AlertService::new(state.db);
    let saved = service
        .save_settings(current_user.uid(), godown_id, settings)
        .await?;
    Ok(Json(saved))
}

/// Products at or below their thresholds
pub async fn list_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: Result<Query<GodownFilter>, QueryRejection>,
) -> AppResult<Json<Vec<StockAlert>>> {
    let Query(filter) = query?;
    let service = AlertService::new(state.db);
    let alerts = service
        .active_alerts(current_user.uid(), filter.godown_id)
        .await?;
    Ok(Json(alerts))
}
