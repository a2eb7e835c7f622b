//! Stock ledger tests
//!
//! Tests for the running-balance ledger including:
//! - Non-negative balance at every date for any accepted movement sequence
//! - Rejected mutations leave the history untouched
//! - Delete then re-create restores every balance
//! - Editing a quantity down and back up restores the balance curve
//! - Serialized mutations of one product cannot overdraw it

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use shared::ledger::{balance_as_of, current_balance};
use shared::{
    validate_movement_draft, validate_mutation, LedgerMutation, LedgerRejection, MovementDraft,
    MovementType, StockMovement,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
}

fn draft(date: NaiveDate, movement_type: MovementType, quantity: Decimal) -> MovementDraft {
    MovementDraft {
        movement_date: date,
        movement_type,
        quantity,
        note: None,
    }
}

/// In-memory stand-in for one product's persisted ledger
#[derive(Debug, Clone)]
struct Ledger {
    opening_stock: Decimal,
    movements: Vec<StockMovement>,
    clock: i64,
}

impl Ledger {
    fn new(opening_stock: Decimal) -> Self {
        Self {
            opening_stock,
            movements: Vec::new(),
            clock: 0,
        }
    }

    fn create(&mut self, draft: &MovementDraft) -> Result<Uuid, LedgerRejection> {
        validate_mutation(self.opening_stock, &self.movements, LedgerMutation::Create(draft))?;
        self.clock += 1;
        let movement = StockMovement {
            id: Uuid::new_v4(),
            product_id: Uuid::nil(),
            movement_date: draft.movement_date,
            movement_type: draft.movement_type,
            quantity: draft.quantity,
            note: draft.note.clone(),
            created_at: Utc.timestamp_opt(1_700_000_000 + self.clock, 0).unwrap(),
            created_by: "tester".to_string(),
        };
        let id = movement.id;
        self.movements.push(movement);
        Ok(id)
    }

    fn update(&mut self, id: Uuid, draft: &MovementDraft) -> Result<(), LedgerRejection> {
        let original = self.find(id).clone();
        validate_mutation(
            self.opening_stock,
            &self.movements,
            LedgerMutation::Update {
                original: &original,
                draft,
            },
        )?;
        let movement = self.movements.iter_mut().find(|m| m.id == id).unwrap();
        movement.movement_date = draft.movement_date;
        movement.movement_type = draft.movement_type;
        movement.quantity = draft.quantity;
        Ok(())
    }

    fn delete(&mut self, id: Uuid) -> Result<(), LedgerRejection> {
        let target = self.find(id).clone();
        validate_mutation(self.opening_stock, &self.movements, LedgerMutation::Delete(&target))?;
        self.movements.retain(|m| m.id != id);
        Ok(())
    }

    fn find(&self, id: Uuid) -> &StockMovement {
        self.movements.iter().find(|m| m.id == id).unwrap()
    }

    fn balance_on(&self, date: NaiveDate) -> Decimal {
        balance_as_of(self.opening_stock, &self.movements, date, None)
    }

    fn current(&self) -> Decimal {
        current_balance(self.opening_stock, &self.movements)
    }

    /// End-of-day balance for each of the first `days` days
    fn curve(&self, days: i64) -> Vec<Decimal> {
        (0..days).map(|n| self.balance_on(day(n))).collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Opening 10, OUT 15 on D1 is refused
    #[test]
    fn test_out_beyond_opening_is_rejected() {
        let mut ledger = Ledger::new(dec("10"));
        let result = ledger.create(&draft(day(1), MovementType::Out, dec("15")));
        assert_eq!(
            result,
            Err(LedgerRejection::NegativeStock {
                date: day(1),
                balance: dec("-5")
            })
        );
        assert!(ledger.movements.is_empty());
    }

    /// Opening 10, IN 20 then OUT 15 on the same day leaves 15
    #[test]
    fn test_same_day_in_then_out() {
        let mut ledger = Ledger::new(dec("10"));
        ledger
            .create(&draft(day(1), MovementType::In, dec("20")))
            .unwrap();
        ledger
            .create(&draft(day(1), MovementType::Out, dec("15")))
            .unwrap();
        assert_eq!(ledger.current(), dec("15"));
    }

    /// Removing supply that a later OUT relied on is refused
    #[test]
    fn test_delete_of_load_bearing_in_is_rejected() {
        let mut ledger = Ledger::new(Decimal::ZERO);
        let supply = ledger
            .create(&draft(day(1), MovementType::In, dec("5")))
            .unwrap();
        ledger
            .create(&draft(day(3), MovementType::Out, dec("3")))
            .unwrap();

        let result = ledger.delete(supply);
        assert_eq!(
            result,
            Err(LedgerRejection::NegativeStock {
                date: day(3),
                balance: dec("-3")
            })
        );
        assert_eq!(ledger.movements.len(), 2);
        assert_eq!(ledger.current(), dec("2"));
    }

    /// The damage shows up several movements downstream, not at the deleted date
    #[test]
    fn test_delete_gap_detected_downstream() {
        let mut ledger = Ledger::new(dec("2"));
        let supply = ledger
            .create(&draft(day(1), MovementType::In, dec("4")))
            .unwrap();
        ledger
            .create(&draft(day(2), MovementType::Out, dec("1")))
            .unwrap();
        ledger
            .create(&draft(day(5), MovementType::Out, dec("5")))
            .unwrap();

        // Without the D1 IN, D1 and D2 stay positive (2, 1) but D5 drops to -4
        assert!(ledger.delete(supply).is_err());
    }

    /// A backdated OUT must not starve a later OUT
    #[test]
    fn test_backdated_out_checked_forward() {
        let mut ledger = Ledger::new(dec("10"));
        ledger
            .create(&draft(day(5), MovementType::Out, dec("8")))
            .unwrap();
        assert!(ledger
            .create(&draft(day(2), MovementType::Out, dec("3")))
            .is_err());
        assert!(ledger
            .create(&draft(day(2), MovementType::Out, dec("2")))
            .is_ok());
        assert_eq!(ledger.current(), Decimal::ZERO);
    }

    /// Editing an IN to a later date can strand an OUT in between
    #[test]
    fn test_update_moving_supply_later_is_rejected() {
        let mut ledger = Ledger::new(Decimal::ZERO);
        let supply = ledger
            .create(&draft(day(1), MovementType::In, dec("6")))
            .unwrap();
        ledger
            .create(&draft(day(3), MovementType::Out, dec("6")))
            .unwrap();

        assert!(ledger
            .update(supply, &draft(day(4), MovementType::In, dec("6")))
            .is_err());
        assert!(ledger
            .update(supply, &draft(day(2), MovementType::In, dec("6")))
            .is_ok());
    }

    /// The old version of an edited movement never counts twice
    #[test]
    fn test_update_excludes_previous_version() {
        let mut ledger = Ledger::new(dec("10"));
        let usage = ledger
            .create(&draft(day(1), MovementType::Out, dec("9")))
            .unwrap();
        ledger
            .update(usage, &draft(day(1), MovementType::Out, dec("10")))
            .unwrap();
        assert_eq!(ledger.current(), Decimal::ZERO);
    }

    /// No movements: current and historical balances equal opening stock
    #[test]
    fn test_empty_history_is_opening_stock() {
        let ledger = Ledger::new(dec("7.5"));
        assert_eq!(ledger.current(), dec("7.5"));
        assert_eq!(ledger.balance_on(day(100)), dec("7.5"));
    }

    #[test]
    fn test_zero_quantity_is_invalid_payload() {
        assert!(validate_movement_draft(&draft(day(1), MovementType::In, Decimal::ZERO)).is_err());
    }

    /// Two OUT 6 requests against opening 10, serialized per product:
    /// exactly one is accepted and the balance ends at 4
    #[test]
    fn test_serialized_concurrent_outs() {
        let ledger = Arc::new(Mutex::new(Ledger::new(dec("10"))));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    let mut locked = ledger.lock().unwrap();
                    locked
                        .create(&draft(day(1), MovementType::Out, dec("6")))
                        .is_ok()
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        let ledger = ledger.lock().unwrap();
        assert_eq!(accepted, 1);
        assert_eq!(ledger.current(), dec("4"));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Create(i64, MovementType, Decimal),
    Update(usize, i64, MovementType, Decimal),
    Delete(usize),
}

fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=500i64).prop_map(|n| Decimal::new(n, 1))
}

fn type_strategy() -> impl Strategy<Value = MovementType> {
    prop_oneof![Just(MovementType::In), Just(MovementType::Out)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0i64..20, type_strategy(), quantity_strategy())
            .prop_map(|(d, t, q)| Op::Create(d, t, q)),
        1 => (any::<usize>(), 0i64..20, type_strategy(), quantity_strategy())
            .prop_map(|(i, d, t, q)| Op::Update(i, d, t, q)),
        1 => any::<usize>().prop_map(Op::Delete),
    ]
}

fn opening_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=200i64).prop_map(|n| Decimal::new(n, 1))
}

/// Apply ops, ignoring rejections; returns the resulting ledger
fn run(opening: Decimal, ops: &[Op]) -> Ledger {
    let mut ledger = Ledger::new(opening);
    for op in ops {
        match op {
            Op::Create(d, t, q) => {
                let _ = ledger.create(&draft(day(*d), *t, *q));
            }
            Op::Update(i, d, t, q) => {
                if !ledger.movements.is_empty() {
                    let id = ledger.movements[i % ledger.movements.len()].id;
                    let _ = ledger.update(id, &draft(day(*d), *t, *q));
                }
            }
            Op::Delete(i) => {
                if !ledger.movements.is_empty() {
                    let id = ledger.movements[i % ledger.movements.len()].id;
                    let _ = ledger.delete(id);
                }
            }
        }
    }
    ledger
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every date of an accepted history has a non-negative balance
        #[test]
        fn prop_balance_never_negative(
            opening in opening_strategy(),
            ops in prop::collection::vec(op_strategy(), 0..40)
        ) {
            let ledger = run(opening, &ops);
            for balance in ledger.curve(22) {
                prop_assert!(balance >= Decimal::ZERO);
            }
        }

        /// A rejected create leaves the movements exactly as they were
        #[test]
        fn prop_rejected_create_changes_nothing(
            opening in opening_strategy(),
            ops in prop::collection::vec(op_strategy(), 0..30),
            d in 0i64..20,
            q in quantity_strategy()
        ) {
            let mut ledger = run(opening, &ops);
            let before = ledger.movements.clone();
            if ledger.create(&draft(day(d), MovementType::Out, q)).is_err() {
                prop_assert_eq!(ledger.movements, before);
            }
        }

        /// Same inputs, same balance
        #[test]
        fn prop_balance_is_deterministic(
            opening in opening_strategy(),
            ops in prop::collection::vec(op_strategy(), 0..30),
            d in 0i64..22
        ) {
            let ledger = run(opening, &ops);
            let first = ledger.balance_on(day(d));
            let second = ledger.balance_on(day(d));
            prop_assert_eq!(first, second);
        }

        /// Deleting a movement and recording it again restores the curve
        #[test]
        fn prop_delete_then_recreate_round_trip(
            opening in opening_strategy(),
            ops in prop::collection::vec(op_strategy(), 1..30),
            pick in any::<usize>()
        ) {
            let mut ledger = run(opening, &ops);
            prop_assume!(!ledger.movements.is_empty());

            let before = ledger.curve(22);
            let target = ledger.movements[pick % ledger.movements.len()].clone();
            if ledger.delete(target.id).is_ok() {
                let recreated = draft(target.movement_date, target.movement_type, target.quantity);
                prop_assert!(ledger.create(&recreated).is_ok());
                prop_assert_eq!(ledger.curve(22), before);
            }
        }

        /// Lowering an OUT quantity and raising it back restores the curve
        #[test]
        fn prop_quantity_down_and_up_round_trip(
            opening in opening_strategy(),
            ops in prop::collection::vec(op_strategy(), 1..30),
            pick in any::<usize>()
        ) {
            let mut ledger = run(opening, &ops);
            let outs: Vec<StockMovement> = ledger
                .movements
                .iter()
                .filter(|m| m.movement_type == MovementType::Out)
                .cloned()
                .collect();
            prop_assume!(!outs.is_empty());

            let target = outs[pick % outs.len()].clone();
            let before = ledger.curve(22);
            let smaller = target.quantity / Decimal::from(2);
            prop_assume!(smaller > Decimal::ZERO);

            ledger
                .update(target.id, &draft(target.movement_date, MovementType::Out, smaller))
                .unwrap();
            ledger
                .update(target.id, &draft(target.movement_date, MovementType::Out, target.quantity))
                .unwrap();
            prop_assert_eq!(ledger.curve(22), before);
        }
    }
}
