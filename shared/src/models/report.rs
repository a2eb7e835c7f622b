//! Report and dashboard payloads

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LedgerLine;
use crate::types::DateRange;

/// Opening/closing position of one product over a date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    pub opening_stock: Decimal,
    pub stock_in: Decimal,
    pub stock_out: Decimal,
    pub closing_stock: Decimal,
    pub movement_count: usize,
}

impl StockSummary {
    /// Whether any movement fell inside the range
    pub fn has_activity(&self) -> bool {
        self.movement_count > 0
    }
}

/// Summed IN and OUT for a single day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub stock_in: Decimal,
    pub stock_out: Decimal,
}

/// Summary report row
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: Option<String>,
    pub company_name: Option<String>,
    pub unit_type_name: Option<String>,
    #[serde(flatten)]
    pub summary: StockSummary,
}

/// Column totals of a summary report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryTotals {
    pub opening_stock: Decimal,
    pub stock_in: Decimal,
    pub stock_out: Decimal,
    pub closing_stock: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub range: DateRange,
    pub godown_id: Option<Uuid>,
    pub rows: Vec<SummaryRow>,
    pub totals: SummaryTotals,
}

/// Closing-stock report row
#[derive(Debug, Clone, Serialize)]
pub struct ClosingStockRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: Option<String>,
    pub opening_stock: Decimal,
    pub closing_stock: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosingStockReport {
    pub range: DateRange,
    pub godown_id: Option<Uuid>,
    pub rows: Vec<ClosingStockRow>,
}

/// Current-stock report row
#[derive(Debug, Clone, Serialize)]
pub struct CurrentStockRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: Option<String>,
    pub company_name: Option<String>,
    pub unit_type_name: Option<String>,
    pub current_stock: Decimal,
    pub min_stock_threshold: Decimal,
    pub below_minimum: bool,
    /// `current_stock × cost_price`; `None` without a cost price or when out of range
    pub stock_value: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentStockReport {
    pub godown_id: Option<Uuid>,
    pub rows: Vec<CurrentStockRow>,
    /// `None` when the sum is out of the decimal range
    pub total_stock_value: Option<Decimal>,
}

/// Movements inside a range with the running balance after each
#[derive(Debug, Clone, Serialize)]
pub struct ProductStatement {
    pub product_id: Uuid,
    pub product_name: String,
    pub opening_stock: Decimal,
    pub lines: Vec<LedgerLine>,
    pub closing_stock: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovementsReport {
    pub range: DateRange,
    pub godown_id: Option<Uuid>,
    pub products: Vec<ProductStatement>,
}

/// Dashboard key figures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardKpis {
    pub godown_count: usize,
    pub product_count: usize,
    pub total_current_stock: Decimal,
    pub total_stock_value: Option<Decimal>,
    pub period_in: Decimal,
    pub period_out: Decimal,
    pub movement_count: usize,
    pub empty_count: usize,
    pub low_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub range: DateRange,
    pub godown_id: Option<Uuid>,
    pub kpis: DashboardKpis,
    pub series: Vec<SeriesPoint>,
}
