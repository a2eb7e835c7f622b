//! Validation for ledger mutations and inventory payloads

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::{balance_as_of, first_negative_balance, movement_deltas};
use crate::models::{AlertSettings, MovementDraft, StockMovement};

pub const MAX_NOTE_LENGTH: usize = 500;

/// Largest quantity, stock figure, price or threshold accepted (10^15).
///
/// Balances are sums of bounded figures, so they stay far inside the range
/// of `Decimal` for any realistic number of movements.
pub const MAX_FIGURE: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Decimal places kept by the `NUMERIC(20,4)` columns
pub const MAX_FIGURE_SCALE: u32 = 4;

// ============================================================================
// Movement Validator
// ============================================================================

/// A proposed change to a product's movement history
#[derive(Debug, Clone, Copy)]
pub enum LedgerMutation<'a> {
    Create(&'a MovementDraft),
    Update {
        original: &'a StockMovement,
        draft: &'a MovementDraft,
    },
    Delete(&'a StockMovement),
}

/// Why a mutation was refused by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerRejection {
    #[error("would result in negative stock ({balance}) on {date}")]
    NegativeStock { date: NaiveDate, balance: Decimal },
}

/// Check that applying `mutation` keeps every point of the timeline non-negative.
///
/// The balance is first checked at the mutation's own date, then the resulting
/// history is replayed forward from the earliest date the mutation touches.
/// `existing` may or may not contain the movement being updated or deleted; it
/// is excluded by id either way.
pub fn validate_mutation(
    opening_stock: Decimal,
    existing: &[StockMovement],
    mutation: LedgerMutation<'_>,
) -> Result<(), LedgerRejection> {
    let (exclude_id, point_date, added, replay_from) = match mutation {
        LedgerMutation::Create(draft) => (
            None,
            draft.movement_date,
            Some((draft.movement_date, draft.signed_quantity())),
            draft.movement_date,
        ),
        LedgerMutation::Update { original, draft } => (
            Some(original.id),
            draft.movement_date,
            Some((draft.movement_date, draft.signed_quantity())),
            original.movement_date.min(draft.movement_date),
        ),
        LedgerMutation::Delete(movement) => {
            (Some(movement.id), movement.movement_date, None, movement.movement_date)
        }
    };

    let point_delta = added.map(|(_, delta)| delta).unwrap_or(Decimal::ZERO);
    let balance = balance_as_of(opening_stock, existing, point_date, exclude_id) + point_delta;
    if balance < Decimal::ZERO {
        return Err(LedgerRejection::NegativeStock {
            date: point_date,
            balance,
        });
    }

    let resulting = movement_deltas(existing, exclude_id).chain(added);
    match first_negative_balance(opening_stock, resulting, replay_from) {
        Some((date, balance)) => Err(LedgerRejection::NegativeStock { date, balance }),
        None => Ok(()),
    }
}

/// Check that rebasing a product on a new opening stock keeps history non-negative
pub fn validate_opening_stock(
    opening_stock: Decimal,
    movements: &[StockMovement],
) -> Result<(), LedgerRejection> {
    match first_negative_balance(opening_stock, movement_deltas(movements, None), NaiveDate::MIN) {
        Some((date, balance)) => Err(LedgerRejection::NegativeStock { date, balance }),
        None => Ok(()),
    }
}

// ============================================================================
// Payload Validations
// ============================================================================

impl MovementDraft {
    /// Quantity must be positive and the note bounded
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_movement_draft(self)
    }
}

/// Validate a movement payload before it reaches the ledger
pub fn validate_movement_draft(draft: &MovementDraft) -> Result<(), &'static str> {
    if draft.quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    if draft.quantity > MAX_FIGURE {
        return Err("Quantity must not exceed 1000000000000000");
    }
    if draft.quantity.normalize().scale() > MAX_FIGURE_SCALE {
        return Err("Quantity must have at most 4 decimal places");
    }
    if let Some(note) = &draft.note {
        if note.chars().count() > MAX_NOTE_LENGTH {
            return Err("Note must be at most 500 characters");
        }
    }
    Ok(())
}

/// Validate a stock, price or threshold figure: zero allowed, never negative
pub fn validate_figure(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("Value cannot be negative");
    }
    if value > MAX_FIGURE {
        return Err("Value must not exceed 1000000000000000");
    }
    if value.normalize().scale() > MAX_FIGURE_SCALE {
        return Err("Value must have at most 4 decimal places");
    }
    Ok(())
}

/// Validate alert thresholds; `known_unit_types` are the godown's unit types
pub fn validate_alert_settings(
    settings: &AlertSettings,
    known_unit_types: &[Uuid],
) -> Result<(), &'static str> {
    validate_threshold_pair(settings.empty_threshold, settings.low_threshold)?;

    let mut seen = Vec::with_capacity(settings.unit_type_overrides.len());
    for unit_override in &settings.unit_type_overrides {
        if !known_unit_types.contains(&unit_override.unit_type_id) {
            return Err("Override refers to an unknown unit type");
        }
        if seen.contains(&unit_override.unit_type_id) {
            return Err("Unit type overrides must be unique");
        }
        seen.push(unit_override.unit_type_id);
        validate_threshold_pair(unit_override.empty_threshold, unit_override.low_threshold)?;
    }
    Ok(())
}

fn validate_threshold_pair(empty: Decimal, low: Decimal) -> Result<(), &'static str> {
    if empty < Decimal::ZERO || low < Decimal::ZERO {
        return Err("Thresholds cannot be negative");
    }
    validate_figure(empty)?;
    validate_figure(low)?;
    if empty > low {
        return Err("Empty threshold must not exceed low threshold");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MovementType, UnitTypeThreshold};
    use chrono::{TimeZone, Utc};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn draft(day: u32, movement_type: MovementType, qty: i64) -> MovementDraft {
        MovementDraft {
            movement_date: date(day),
            movement_type,
            quantity: Decimal::from(qty),
            note: None,
        }
    }

    fn recorded(day: u32, movement_type: MovementType, qty: i64, seq: i64) -> StockMovement {
        StockMovement {
            id: Uuid::new_v4(),
            product_id: Uuid::nil(),
            movement_date: date(day),
            movement_type,
            quantity: Decimal::from(qty),
            note: None,
            created_at: Utc.timestamp_opt(1_700_000_000 + seq, 0).unwrap(),
            created_by: "tester".to_string(),
        }
    }

    #[test]
    fn test_create_out_beyond_opening_is_rejected() {
        let proposed = draft(1, MovementType::Out, 15);
        let result = validate_mutation(Decimal::from(10), &[], LedgerMutation::Create(&proposed));
        assert_eq!(
            result,
            Err(LedgerRejection::NegativeStock {
                date: date(1),
                balance: Decimal::from(-5)
            })
        );
    }

    #[test]
    fn test_create_backdated_out_that_starves_later_out_is_rejected() {
        // Opening 10, D3 OUT 10 already recorded; D1 OUT 5 passes the point
        // check (balance 5) but leaves D3 at -5.
        let existing = vec![recorded(3, MovementType::Out, 10, 0)];
        let proposed = draft(1, MovementType::Out, 5);
        let result = validate_mutation(Decimal::from(10), &existing, LedgerMutation::Create(&proposed));
        assert_eq!(
            result,
            Err(LedgerRejection::NegativeStock {
                date: date(3),
                balance: Decimal::from(-5)
            })
        );
    }

    #[test]
    fn test_update_excludes_old_version() {
        let original = recorded(1, MovementType::Out, 8, 0);
        let existing = vec![original.clone()];
        // Opening 10: the old OUT 8 must not count against the new OUT 10
        let edited = draft(1, MovementType::Out, 10);
        assert!(validate_mutation(
            Decimal::from(10),
            &existing,
            LedgerMutation::Update { original: &original, draft: &edited }
        )
        .is_ok());
    }

    #[test]
    fn test_update_moving_in_later_is_rejected() {
        let supply = recorded(1, MovementType::In, 5, 0);
        let existing = vec![supply.clone(), recorded(2, MovementType::Out, 5, 1)];
        let moved = draft(4, MovementType::In, 5);
        let result = validate_mutation(
            Decimal::ZERO,
            &existing,
            LedgerMutation::Update { original: &supply, draft: &moved },
        );
        assert_eq!(
            result,
            Err(LedgerRejection::NegativeStock {
                date: date(2),
                balance: Decimal::from(-5)
            })
        );
    }

    #[test]
    fn test_delete_of_load_bearing_supply_is_rejected() {
        let supply = recorded(1, MovementType::In, 5, 0);
        let existing = vec![supply.clone(), recorded(3, MovementType::Out, 3, 1)];
        let result = validate_mutation(Decimal::ZERO, &existing, LedgerMutation::Delete(&supply));
        assert_eq!(
            result,
            Err(LedgerRejection::NegativeStock {
                date: date(3),
                balance: Decimal::from(-3)
            })
        );
    }

    #[test]
    fn test_delete_of_out_movement_is_accepted() {
        let usage = recorded(2, MovementType::Out, 3, 1);
        let existing = vec![recorded(1, MovementType::In, 5, 0), usage.clone()];
        assert!(validate_mutation(Decimal::ZERO, &existing, LedgerMutation::Delete(&usage)).is_ok());
    }

    #[test]
    fn test_opening_stock_reduction_checked_against_history() {
        let existing = vec![recorded(1, MovementType::Out, 4, 0)];
        assert!(validate_opening_stock(Decimal::from(4), &existing).is_ok());
        assert!(validate_opening_stock(Decimal::from(3), &existing).is_err());
    }

    #[test]
    fn test_zero_quantity_is_invalid() {
        assert!(validate_movement_draft(&draft(1, MovementType::In, 0)).is_err());
        assert!(validate_movement_draft(&draft(1, MovementType::In, -2)).is_err());
        assert!(validate_movement_draft(&draft(1, MovementType::In, 1)).is_ok());
    }

    #[test]
    fn test_long_note_is_invalid() {
        let mut long = draft(1, MovementType::In, 1);
        long.note = Some("x".repeat(MAX_NOTE_LENGTH + 1));
        assert!(validate_movement_draft(&long).is_err());
    }

    #[test]
    fn test_quantity_bounded_at_max_figure() {
        let mut at_max = draft(1, MovementType::In, 1);
        at_max.quantity = MAX_FIGURE;
        assert!(validate_movement_draft(&at_max).is_ok());

        let mut above = at_max.clone();
        above.quantity = MAX_FIGURE + Decimal::new(1, 4);
        assert!(validate_movement_draft(&above).is_err());

        let mut huge = at_max.clone();
        huge.quantity = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        assert!(validate_movement_draft(&huge).is_err());
    }

    #[test]
    fn test_quantity_scale_limited_to_four_places() {
        let mut fine = draft(1, MovementType::In, 1);
        fine.quantity = Decimal::new(12_345, 4);
        assert!(validate_movement_draft(&fine).is_ok());

        // Trailing zeros do not count
        fine.quantity = Decimal::new(1_500_000, 6);
        assert!(validate_movement_draft(&fine).is_ok());

        fine.quantity = Decimal::new(123_456, 5);
        assert!(validate_movement_draft(&fine).is_err());
    }

    #[test]
    fn test_figure_bounds() {
        assert_eq!(MAX_FIGURE, Decimal::from(1_000_000_000_000_000i64));
        assert!(validate_figure(Decimal::ZERO).is_ok());
        assert!(validate_figure(MAX_FIGURE).is_ok());
        assert!(validate_figure(MAX_FIGURE + Decimal::ONE).is_err());
        assert!(validate_figure(Decimal::from(-1)).is_err());
        assert!(validate_figure(Decimal::new(1, 5)).is_err());
    }

    #[test]
    fn test_max_quantities_do_not_overflow_the_ledger() {
        let existing: Vec<StockMovement> = (0..1000)
            .map(|i| {
                let mut m = recorded(1, MovementType::In, 1, i);
                m.quantity = MAX_FIGURE;
                m
            })
            .collect();
        let mut next = draft(2, MovementType::In, 1);
        next.quantity = MAX_FIGURE;
        assert!(validate_mutation(MAX_FIGURE, &existing, LedgerMutation::Create(&next)).is_ok());
    }

    #[test]
    fn test_alert_settings_validation() {
        let unit = Uuid::new_v4();
        let mut settings = AlertSettings::default();
        assert!(validate_alert_settings(&settings, &[]).is_ok());

        settings.empty_threshold = Decimal::from(5);
        assert!(validate_alert_settings(&settings, &[]).is_err());

        settings.empty_threshold = Decimal::ONE;
        settings.unit_type_overrides.push(UnitTypeThreshold {
            unit_type_id: unit,
            empty_threshold: Decimal::ZERO,
            low_threshold: Decimal::TEN,
        });
        assert!(validate_alert_settings(&settings, &[]).is_err());
        assert!(validate_alert_settings(&settings, &[unit]).is_ok());

        settings.unit_type_overrides.push(settings.unit_type_overrides[0].clone());
        assert!(validate_alert_settings(&settings, &[unit]).is_err());
    }
}
