//! Reporting and dashboard handlers

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use shared::{ClosingStockReport, CurrentStockReport, Dashboard, DashboardRange, DateRange};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::reporting::{Report, ReportKind, ReportingService};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub godown_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStockQuery {
    pub godown_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub range: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub godown_id: Option<Uuid>,
}

fn report_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> AppResult<DateRange> {
    DateRange::from_bounds(from, to).map_err(|msg| {
        let field = if from.is_none() { "from" } else { "to" };
        AppError::invalid(field, msg)
    })
}

/// Pick the dashboard window: a named preset, explicit dates, or the last 30 days
fn dashboard_range(query: &DashboardQuery, today: NaiveDate) -> AppResult<DateRange> {
    let preset = match query.range.as_deref() {
        Some(name) => DashboardRange::parse(name)
            .ok_or_else(|| AppError::invalid("range", format!("Unknown range '{}'", name)))?,
        None if query.from.is_some() || query.to.is_some() => DashboardRange::Custom,
        None => DashboardRange::Last30Days,
    };

    preset
        .resolve(today, query.from, query.to)
        .map_err(|msg| AppError::invalid("range", msg))
}

/// Summary report (default) or ledger statements with `type=movements`
pub async fn get_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> AppResult<Json<Report>> {
    let Query(query) = query?;
    let kind = ReportKind::parse(query.report_type.as_deref())
        .ok_or_else(|| AppError::invalid("type", "type must be 'summary' or 'movements'"))?;
    let range = report_range(query.from, query.to)?;

    let service = ReportingService::new(state.db);
    let report = service
        .report(current_user.uid(), kind, range, query.godown_id)
        .await?;
    Ok(Json(report))
}

/// Opening and closing stock per product over a range
pub async fn get_closing_stock_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> AppResult<Json<ClosingStockReport>> {
    let Query(query) = query?;
    let range = report_range(query.from, query.to)?;

    let service = ReportingService::new(state.db);
    let report = service
        .closing_stock(current_user.uid(), range, query.godown_id)
        .await?;
    Ok(Json(report))
}

pub async fn get_current_stock_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: Result<Query<CurrentStockQuery>, QueryRejection>,
) -> AppResult<Json<CurrentStockReport>> {
    let Query(query) = query?;
    let service = ReportingService::new(state.db);
    let report = service
        .current_stock(current_user.uid(), query.godown_id)
        .await?;
    Ok(Json(report))
}

/// Dashboard KPIs and chart series
pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> AppResult<Json<Dashboard>> {
    let Query(query) = query?;
    let range = dashboard_range(&query, Utc::now().date_naive())?;

    let service = ReportingService::new(state.db);
    let dashboard = service
        .dashboard(current_user.uid(), range, query.godown_id)
        .await?;
    Ok(Json(dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn query(range: Option<&str>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> DashboardQuery {
        DashboardQuery {
            range: range.map(str::to_string),
            from,
            to,
            godown_id: None,
        }
    }

    #[test]
    fn test_dashboard_defaults_to_last_30_days() {
        let range = dashboard_range(&query(None, None, None), date(30)).unwrap();
        assert_eq!(range.start, date(1));
        assert_eq!(range.end, date(30));
    }

    #[test]
    fn test_explicit_dates_without_range_are_custom() {
        let range = dashboard_range(&query(None, Some(date(3)), Some(date(9))), date(30)).unwrap();
        assert_eq!(range, DateRange::new(date(3), date(9)).unwrap());
        assert!(dashboard_range(&query(None, Some(date(3)), None), date(30)).is_err());
    }

    #[test]
    fn test_custom_range_requires_both_dates() {
        assert!(dashboard_range(&query(Some("custom"), None, None), date(30)).is_err());
        assert!(dashboard_range(&query(Some("fortnight"), None, None), date(30)).is_err());
    }

    #[test]
    fn test_report_range_names_missing_bound() {
        match report_range(None, Some(date(2))) {
            Err(AppError::InvalidPayload { field, .. }) => assert_eq!(field.as_deref(), Some("from")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
