//! Stock alert configuration and results

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_EMPTY_THRESHOLD: Decimal = Decimal::ZERO;
pub const DEFAULT_LOW_THRESHOLD: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Alert configuration for one godown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    #[serde(default = "default_empty_threshold")]
    pub empty_threshold: Decimal,
    #[serde(default = "default_low_threshold")]
    pub low_threshold: Decimal,
    #[serde(default)]
    pub unit_type_overrides: Vec<UnitTypeThreshold>,
}

/// Per-unit-type override of the global thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTypeThreshold {
    pub unit_type_id: Uuid,
    pub empty_threshold: Decimal,
    pub low_threshold: Decimal,
}

/// The pair of boundaries applied to one product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub empty_threshold: Decimal,
    pub low_threshold: Decimal,
}

/// Stock classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertType {
    Empty,
    Low,
    Ok,
}

/// Evaluated alert for a single product
#[derive(Debug, Clone, Serialize)]
pub struct StockAlert {
    pub product_id: Uuid,
    pub product_name: String,
    pub godown_id: Uuid,
    pub unit_type_id: Uuid,
    pub current_stock: Decimal,
    pub alert_type: AlertType,
    pub empty_threshold: Decimal,
    pub low_threshold: Decimal,
}

fn default_empty_threshold() -> Decimal {
    DEFAULT_EMPTY_THRESHOLD
}

fn default_low_threshold() -> Decimal {
    DEFAULT_LOW_THRESHOLD
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            empty_threshold: DEFAULT_EMPTY_THRESHOLD,
            low_threshold: DEFAULT_LOW_THRESHOLD,
            unit_type_overrides: Vec::new(),
        }
    }
}
