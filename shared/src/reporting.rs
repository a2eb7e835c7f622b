//! Aggregation over full movement histories
//!
//! An [`InventorySnapshot`] holds a tenant's products and every movement
//! recorded against them. Reports are derived from it on each call; no
//! running totals are cached anywhere.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::alerts::count_by_level;
use crate::ledger::{balance_before, current_balance, running_balances, sort_chronologically};
use crate::models::{
    ClosingStockReport, ClosingStockRow, CurrentStockReport, CurrentStockRow, DashboardKpis,
    MovementType, MovementsReport, Product, ProductStatement, SeriesPoint, StockAlert,
    StockMovement, StockSummary, SummaryReport, SummaryRow, SummaryTotals,
};
use crate::types::DateRange;

/// Opening, period totals and closing of one product's history over `range`
pub fn summarize(opening_stock: Decimal, movements: &[StockMovement], range: &DateRange) -> StockSummary {
    let opening = balance_before(opening_stock, movements, range.start);

    let (stock_in, stock_out, movement_count) = movements
        .iter()
        .filter(|m| range.contains(m.movement_date))
        .fold((Decimal::ZERO, Decimal::ZERO, 0), |(inn, out, count), m| match m.movement_type {
            MovementType::In => (inn + m.quantity, out, count + 1),
            MovementType::Out => (inn, out + m.quantity, count + 1),
        });

    StockSummary {
        opening_stock: opening,
        stock_in,
        stock_out,
        closing_stock: opening + stock_in - stock_out,
        movement_count,
    }
}

/// Group movements inside `range` by date; days without movements are omitted
pub fn time_series<'a, I>(movements: I, range: &DateRange) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = &'a StockMovement>,
{
    let mut buckets: BTreeMap<_, (Decimal, Decimal)> = BTreeMap::new();
    for m in movements.into_iter().filter(|m| range.contains(m.movement_date)) {
        let bucket = buckets.entry(m.movement_date).or_default();
        match m.movement_type {
            MovementType::In => bucket.0 += m.quantity,
            MovementType::Out => bucket.1 += m.quantity,
        }
    }

    buckets
        .into_iter()
        .map(|(date, (stock_in, stock_out))| SeriesPoint {
            date,
            stock_in,
            stock_out,
        })
        .collect()
}

/// `cost × stock` summed over priced products; `None` once it leaves the `Decimal` range
fn total_stock_value<'a, I>(stocks: I) -> Option<Decimal>
where
    I: IntoIterator<Item = (&'a Product, Decimal)>,
{
    stocks
        .into_iter()
        .try_fold(Decimal::ZERO, |total, (product, stock)| match product.cost_price {
            Some(cost) => total.checked_add(cost.checked_mul(stock)?),
            None => Some(total),
        })
}

/// A tenant's products with their complete movement histories
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    products: Vec<Product>,
    movements: HashMap<Uuid, Vec<StockMovement>>,
    company_names: HashMap<Uuid, String>,
    unit_type_names: HashMap<Uuid, String>,
}

impl InventorySnapshot {
    /// Build a snapshot; movements of unknown products are dropped
    pub fn new(mut products: Vec<Product>, movements: Vec<StockMovement>) -> Self {
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let mut by_product: HashMap<Uuid, Vec<StockMovement>> =
            products.iter().map(|p| (p.id, Vec::new())).collect();
        for movement in movements {
            if let Some(list) = by_product.get_mut(&movement.product_id) {
                list.push(movement);
            }
        }
        for list in by_product.values_mut() {
            sort_chronologically(list);
        }

        Self {
            products,
            movements: by_product,
            company_names: HashMap::new(),
            unit_type_names: HashMap::new(),
        }
    }

    /// Attach display names for companies and unit types
    pub fn with_names(
        mut self,
        company_names: HashMap<Uuid, String>,
        unit_type_names: HashMap<Uuid, String>,
    ) -> Self {
        self.company_names = company_names;
        self.unit_type_names = unit_type_names;
        self
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Chronologically sorted movements of a product
    pub fn movements_for(&self, product_id: Uuid) -> &[StockMovement] {
        self.movements
            .get(&product_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn current_stock(&self, product: &Product) -> Decimal {
        current_balance(product.opening_stock, self.movements_for(product.id))
    }

    /// Every product paired with its current stock
    pub fn current_stocks(&self) -> impl Iterator<Item = (&Product, Decimal)> + '_ {
        self.products.iter().map(move |p| (p, self.current_stock(p)))
    }

    fn summary_of(&self, product: &Product, range: &DateRange) -> StockSummary {
        summarize(product.opening_stock, self.movements_for(product.id), range)
    }

    fn company_name(&self, product: &Product) -> Option<String> {
        self.company_names.get(&product.company_id).cloned()
    }

    fn unit_type_name(&self, product: &Product) -> Option<String> {
        self.unit_type_names.get(&product.unit_type_id).cloned()
    }

    /// Per-product opening/IN/OUT/closing; products idle in the range are left out
    pub fn summary_report(&self, range: DateRange, godown_id: Option<Uuid>) -> SummaryReport {
        let rows: Vec<SummaryRow> = self
            .products
            .iter()
            .map(|p| (p, self.summary_of(p, &range)))
            .filter(|(_, summary)| summary.has_activity())
            .map(|(p, summary)| SummaryRow {
                product_id: p.id,
                product_name: p.name.clone(),
                sku: p.sku.clone(),
                company_name: self.company_name(p),
                unit_type_name: self.unit_type_name(p),
                summary,
            })
            .collect();

        let totals = rows.iter().fold(SummaryTotals::default(), |mut totals, row| {
            totals.opening_stock += row.summary.opening_stock;
            totals.stock_in += row.summary.stock_in;
            totals.stock_out += row.summary.stock_out;
            totals.closing_stock += row.summary.closing_stock;
            totals
        });

        SummaryReport {
            range,
            godown_id,
            rows,
            totals,
        }
    }

    /// Opening at `range.start` and closing at `range.end`; idle products are left out
    pub fn closing_stock_report(&self, range: DateRange, godown_id: Option<Uuid>) -> ClosingStockReport {
        let rows = self
            .products
            .iter()
            .map(|p| (p, self.summary_of(p, &range)))
            .filter(|(_, summary)| summary.has_activity())
            .map(|(p, summary)| ClosingStockRow {
                product_id: p.id,
                product_name: p.name.clone(),
                sku: p.sku.clone(),
                opening_stock: summary.opening_stock,
                closing_stock: summary.closing_stock,
            })
            .collect();

        ClosingStockReport {
            range,
            godown_id,
            rows,
        }
    }

    /// Current stock of every product, including untouched ones
    pub fn current_stock_report(&self, godown_id: Option<Uuid>) -> CurrentStockReport {
        let rows: Vec<CurrentStockRow> = self
            .current_stocks()
            .map(|(p, current_stock)| CurrentStockRow {
                product_id: p.id,
                product_name: p.name.clone(),
                sku: p.sku.clone(),
                company_name: self.company_name(p),
                unit_type_name: self.unit_type_name(p),
                current_stock,
                min_stock_threshold: p.min_stock_threshold,
                below_minimum: current_stock < p.min_stock_threshold,
                stock_value: p.cost_price.and_then(|cost| cost.checked_mul(current_stock)),
            })
            .collect();

        CurrentStockReport {
            godown_id,
            rows,
            total_stock_value: total_stock_value(self.current_stocks()),
        }
    }

    /// Ledger statement per active product: movements in range with running balances
    pub fn movements_report(&self, range: DateRange, godown_id: Option<Uuid>) -> MovementsReport {
        let products = self
            .products
            .iter()
            .filter_map(|p| {
                let history = self.movements_for(p.id);
                let summary = summarize(p.opening_stock, history, &range);
                if !summary.has_activity() {
                    return None;
                }

                let lines = running_balances(p.opening_stock, history)
                    .into_iter()
                    .filter(|line| range.contains(line.movement.movement_date))
                    .collect();

                Some(ProductStatement {
                    product_id: p.id,
                    product_name: p.name.clone(),
                    opening_stock: summary.opening_stock,
                    lines,
                    closing_stock: summary.closing_stock,
                })
            })
            .collect();

        MovementsReport {
            range,
            godown_id,
            products,
        }
    }

    /// Daily IN/OUT across all products in the snapshot
    pub fn time_series(&self, range: &DateRange) -> Vec<SeriesPoint> {
        time_series(self.movements.values().flatten(), range)
    }

    /// Dashboard figures; `alerts` must come from the same snapshot
    pub fn dashboard_kpis(&self, range: &DateRange, godown_count: usize, alerts: &[StockAlert]) -> DashboardKpis {
        let (empty_count, low_count) = count_by_level(alerts);

        let mut kpis = DashboardKpis {
            godown_count,
            product_count: self.products.len(),
            total_stock_value: total_stock_value(self.current_stocks()),
            empty_count,
            low_count,
            ..DashboardKpis::default()
        };

        for (product, current_stock) in self.current_stocks() {
            kpis.total_current_stock += current_stock;
            let summary = self.summary_of(product, range);
            kpis.period_in += summary.stock_in;
            kpis.period_out += summary.stock_out;
            kpis.movement_count += summary.movement_count;
        }

        kpis
    }
}
