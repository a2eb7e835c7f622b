//! Running-balance calculations over a product's movement history
//!
//! Balances are computed at date granularity: every movement dated on or
//! before a target date counts toward the balance of that date, regardless of
//! its time of entry. Nothing here touches storage; all functions are pure.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{LedgerLine, StockMovement};

/// Sort movements by `(movement_date, created_at)` ascending
pub fn sort_chronologically(movements: &mut [StockMovement]) {
    movements.sort_by(|a, b| {
        a.movement_date
            .cmp(&b.movement_date)
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// Balance of a product as of the end of `target_date`.
///
/// Movements dated after `target_date` are ignored, as is the movement with
/// id `exclude_id` when given. Input order does not matter.
pub fn balance_as_of(
    opening_stock: Decimal,
    movements: &[StockMovement],
    target_date: NaiveDate,
    exclude_id: Option<Uuid>,
) -> Decimal {
    movements
        .iter()
        .filter(|m| Some(m.id) != exclude_id)
        .filter(|m| m.movement_date <= target_date)
        .fold(opening_stock, |balance, m| balance + m.signed_quantity())
}

/// Balance before any movement dated on or after `date`
pub fn balance_before(opening_stock: Decimal, movements: &[StockMovement], date: NaiveDate) -> Decimal {
    movements
        .iter()
        .filter(|m| m.movement_date < date)
        .fold(opening_stock, |balance, m| balance + m.signed_quantity())
}

/// Balance with every recorded movement applied
pub fn current_balance(opening_stock: Decimal, movements: &[StockMovement]) -> Decimal {
    movements
        .iter()
        .fold(opening_stock, |balance, m| balance + m.signed_quantity())
}

/// Pair each movement with the balance right after it, in chronological order
pub fn running_balances(opening_stock: Decimal, movements: &[StockMovement]) -> Vec<LedgerLine> {
    let mut ordered = movements.to_vec();
    sort_chronologically(&mut ordered);

    let mut balance = opening_stock;
    ordered
        .into_iter()
        .map(|movement| {
            balance += movement.signed_quantity();
            LedgerLine {
                movement,
                balance_after: balance,
            }
        })
        .collect()
}

/// End-of-day balances for every date on or after `from` that has activity.
///
/// `deltas` are `(date, signed quantity)` pairs; the result is ordered by date.
pub fn daily_closing_balances<I>(opening_stock: Decimal, deltas: I, from: NaiveDate) -> Vec<(NaiveDate, Decimal)>
where
    I: IntoIterator<Item = (NaiveDate, Decimal)>,
{
    let mut carried = opening_stock;
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for (date, delta) in deltas {
        if date < from {
            carried += delta;
        } else {
            *by_day.entry(date).or_insert(Decimal::ZERO) += delta;
        }
    }

    by_day
        .into_iter()
        .map(|(date, delta)| {
            carried += delta;
            (date, carried)
        })
        .collect()
}

/// First date whose end-of-day balance is negative, replaying from `from`
pub fn first_negative_balance<I>(opening_stock: Decimal, deltas: I, from: NaiveDate) -> Option<(NaiveDate, Decimal)>
where
    I: IntoIterator<Item = (NaiveDate, Decimal)>,
{
    daily_closing_balances(opening_stock, deltas, from)
        .into_iter()
        .find(|(_, balance)| *balance < Decimal::ZERO)
}

/// Signed `(date, quantity)` pairs of recorded movements, minus `exclude_id`
pub fn movement_deltas(
    movements: &[StockMovement],
    exclude_id: Option<Uuid>,
) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
    movements
        .iter()
        .filter(move |m| Some(m.id) != exclude_id)
        .map(|m| (m.movement_date, m.signed_quantity()))
}
