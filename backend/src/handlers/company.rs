//! HTTP handlers for companies

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::Company;

use crate::error::AppResult;
use crate::handlers::godown::GodownFilter;
use crate::middleware::CurrentUser;
use crate::services::company::{CreateCompanyInput, UpdateCompanyInput};
use crate::services::CompanyService;
use crate::AppState;

pub async fn list_companies(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: Result<Query<GodownFilter>, QueryRejection>,
) -> AppResult<Json<Vec<Company>>> {
    let Query(filter) = query?;
    let service = CompanyService::new(state.db);
    let companies = service.list(current_user.uid(), filter.godown_id).await?;
    Ok(Json(companies))
}

pub async fn get_company(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Company>> {
    let service = CompanyService::new(state.db);
    let company = service.get(current_user.uid(), company_id).await?;
    Ok(Json(company))
}

pub async fn create_company(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: Result<Json<CreateCompanyInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Company>)> {
    let Json(input) = payload?;
    let service = CompanyService::new(state.db);
    let company = service.create(current_user.uid(), input).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn update_company(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(company_id): Path<Uuid>,
    payload: Result<Json<UpdateCompanyInput>, JsonRejection>,
) -> AppResult<Json<Company>> {
    let Json(input) = payload?;
    let service = CompanyService::new(state.db);
    let company = service.update(current_user.uid(), company_id, input).await?;
    Ok(Json(company))
}

pub async fn delete_company(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(company_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = CompanyService::new(state.db);
    service.delete(current_user.uid(), company_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
