//! Reporting and dashboard service
//!
//! Loads a snapshot of the tenant's inventory and hands it to the pure
//! aggregation engine in `shared::reporting`. Nothing is cached.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::alerts::evaluate_all;
use shared::reporting::InventorySnapshot;
use shared::{
    ClosingStockReport, CurrentStockReport, Dashboard, DateRange, MovementsReport, SummaryReport,
};

use crate::error::{AppError, AppResult};
use crate::services::{AlertService, GodownService, InventoryService};

/// Which report `GET /reports` produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Summary,
    Movements,
}

impl ReportKind {
    /// `None` selects the summary report
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("summary") => Some(ReportKind::Summary),
            Some("movements") => Some(ReportKind::Movements),
            Some(_) => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report {
    Summary(SummaryReport),
    Movements(MovementsReport),
}

#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn snapshot(&self, uid: &str, godown_id: Option<Uuid>) -> AppResult<InventorySnapshot> {
        if let Some(godown_id) = godown_id {
            GodownService::new(self.db.clone())
                .ensure_owned(uid, godown_id)
                .await?;
        }
        InventoryService::new(self.db.clone())
            .load_snapshot(uid, godown_id)
            .await
    }

    /// Summary or ledger-statement report; 404 when there are no products at all
    pub async fn report(
        &self,
        uid: &str,
        kind: ReportKind,
        range: DateRange,
        godown_id: Option<Uuid>,
    ) -> AppResult<Report> {
        let snapshot = self.snapshot(uid, godown_id).await?;
        if snapshot.is_empty() {
            return Err(AppError::NotFound("Products".to_string()));
        }

        Ok(match kind {
            ReportKind::Summary => Report::Summary(snapshot.summary_report(range, godown_id)),
            ReportKind::Movements => Report::Movements(snapshot.movements_report(range, godown_id)),
        })
    }

    pub async fn closing_stock(
        &self,
        uid: &str,
        range: DateRange,
        godown_id: Option<Uuid>,
    ) -> AppResult<ClosingStockReport> {
        let snapshot = self.snapshot(uid, godown_id).await?;
        Ok(snapshot.closing_stock_report(range, godown_id))
    }

    pub async fn current_stock(
        &self,
        uid: &str,
        godown_id: Option<Uuid>,
    ) -> AppResult<CurrentStockReport> {
        let snapshot = self.snapshot(uid, godown_id).await?;
        Ok(snapshot.current_stock_report(godown_id))
    }

    /// KPIs and daily IN/OUT series for the resolved range
    pub async fn dashboard(
        &self,
        uid: &str,
        range: DateRange,
        godown_id: Option<Uuid>,
    ) -> AppResult<Dashboard> {
        let snapshot = self.snapshot(uid, godown_id).await?;
        let settings = AlertService::new(self.db.clone())
            .settings_by_godown(uid)
            .await?;
        let alerts = evaluate_all(snapshot.current_stocks(), &settings);

        let godown_count = match godown_id {
            Some(_) => 1,
            None => {
                let count = GodownService::new(self.db.clone()).count(uid).await?;
                usize::try_from(count).map_err(|e| AppError::Internal(e.to_string()))?
            }
        };

        Ok(Dashboard {
            range,
            godown_id,
            kpis: snapshot.dashboard_kpis(&range, godown_count, &alerts),
            series: snapshot.time_series(&range),
        })
    }
}
