//! Stock alert tests
//!
//! Tests for alert evaluation including:
//! - EMPTY / LOW / OK classification at the threshold boundaries
//! - Unit type overrides taking precedence over godown thresholds
//! - Defaults for godowns without stored settings
//! - Settings validation

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use chrono::Utc;
use shared::alerts::{classify, count_by_level, evaluate_all};
use shared::{
    validate_alert_settings, AlertSettings, AlertType, Product, Thresholds, UnitTypeThreshold,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn product(godown_id: Uuid, unit_type_id: Uuid) -> Product {
    Product {
        id: Uuid::new_v4(),
        godown_id,
        company_id: Uuid::new_v4(),
        unit_type_id,
        name: "Item".to_string(),
        sku: None,
        opening_stock: Decimal::ZERO,
        min_stock_threshold: Decimal::ZERO,
        cost_price: None,
        selling_price: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_settings() {
        let p = product(Uuid::new_v4(), Uuid::new_v4());
        let alerts = evaluate_all([(&p, dec("2"))], &HashMap::new());
        assert_eq!(alerts[0].alert_type, AlertType::Low);
        assert_eq!(alerts[0].empty_threshold, Decimal::ZERO);
        assert_eq!(alerts[0].low_threshold, dec("3"));
    }

    #[test]
    fn test_godown_settings_and_overrides() {
        let godown = Uuid::new_v4();
        let crates = Uuid::new_v4();
        let loose = Uuid::new_v4();
        let settings = AlertSettings {
            empty_threshold: dec("1"),
            low_threshold: dec("10"),
            unit_type_overrides: vec![UnitTypeThreshold {
                unit_type_id: crates,
                empty_threshold: Decimal::ZERO,
                low_threshold: dec("2"),
            }],
        };
        let by_godown = HashMap::from([(godown, settings)]);

        let crate_item = product(godown, crates);
        let loose_item = product(godown, loose);
        let elsewhere = product(Uuid::new_v4(), loose);

        let alerts = evaluate_all(
            [
                (&crate_item, dec("5")),
                (&loose_item, dec("5")),
                (&elsewhere, dec("5")),
            ],
            &by_godown,
        );

        assert_eq!(alerts[0].alert_type, AlertType::Ok);
        assert_eq!(alerts[1].alert_type, AlertType::Low);
        // Other godown falls back to the defaults (0 / 3)
        assert_eq!(alerts[2].alert_type, AlertType::Ok);
        assert_eq!(count_by_level(&alerts), (0, 1));
    }

    #[test]
    fn test_settings_document_defaults() {
        let settings: AlertSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, AlertSettings::default());

        let partial: AlertSettings = serde_json::from_str(r#"{"low_threshold": "8"}"#).unwrap();
        assert_eq!(partial.empty_threshold, Decimal::ZERO);
        assert_eq!(partial.low_threshold, dec("8"));
    }

    #[test]
    fn test_settings_validation() {
        let unit = Uuid::new_v4();
        let mut settings = AlertSettings::default();
        settings.unit_type_overrides.push(UnitTypeThreshold {
            unit_type_id: unit,
            empty_threshold: dec("4"),
            low_threshold: dec("2"),
        });
        // empty above low
        assert!(validate_alert_settings(&settings, &[unit]).is_err());

        settings.unit_type_overrides[0].empty_threshold = dec("1");
        assert!(validate_alert_settings(&settings, &[unit]).is_ok());
        // unit type of another godown
        assert!(validate_alert_settings(&settings, &[Uuid::new_v4()]).is_err());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn threshold_pair() -> impl Strategy<Value = Thresholds> {
        (0i64..=1000, 0i64..=1000).prop_map(|(a, b)| Thresholds {
            empty_threshold: Decimal::new(a.min(b), 1),
            low_threshold: Decimal::new(a.max(b), 1),
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Classification follows the two boundaries exactly
        #[test]
        fn prop_classification_matches_boundaries(
            thresholds in threshold_pair(),
            stock in (-100i64..=1500).prop_map(|n| Decimal::new(n, 1))
        ) {
            let expected = if stock <= thresholds.empty_threshold {
                AlertType::Empty
            } else if stock <= thresholds.low_threshold {
                AlertType::Low
            } else {
                AlertType::Ok
            };
            prop_assert_eq!(classify(stock, thresholds), expected);
        }

        /// More stock never yields a more severe alert
        #[test]
        fn prop_classification_is_monotonic(
            thresholds in threshold_pair(),
            a in 0i64..=1500,
            b in 0i64..=1500
        ) {
            let severity = |t: AlertType| match t {
                AlertType::Empty => 2,
                AlertType::Low => 1,
                AlertType::Ok => 0,
            };
            let low = classify(Decimal::new(a.min(b), 1), thresholds);
            let high = classify(Decimal::new(a.max(b), 1), thresholds);
            prop_assert!(severity(high) <= severity(low));
        }
    }
}
