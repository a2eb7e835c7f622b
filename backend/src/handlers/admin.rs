//! Admin portal handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::admin::{AdminOverview, AdminService};
use crate::AppState;

/// Per-tenant entity counts
pub async fn get_overview(State(state): State<AppState>) -> AppResult<Json<AdminOverview>> {
    let service = AdminService::new(state.db);
    let overview = service.overview().await?;
    Ok(Json(overview))
}
