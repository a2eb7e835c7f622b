//! Stock level classification against alert thresholds

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{AlertSettings, AlertType, Product, StockAlert, Thresholds};

impl AlertSettings {
    /// Thresholds for a unit type: its override if configured, else the global pair
    pub fn thresholds_for(&self, unit_type_id: Uuid) -> Thresholds {
        self.unit_type_overrides
            .iter()
            .find(|o| o.unit_type_id == unit_type_id)
            .map(|o| Thresholds {
                empty_threshold: o.empty_threshold,
                low_threshold: o.low_threshold,
            })
            .unwrap_or(Thresholds {
                empty_threshold: self.empty_threshold,
                low_threshold: self.low_threshold,
            })
    }
}

/// Classify a stock level
pub fn classify(current_stock: Decimal, thresholds: Thresholds) -> AlertType {
    if current_stock <= thresholds.empty_threshold {
        AlertType::Empty
    } else if current_stock <= thresholds.low_threshold {
        AlertType::Low
    } else {
        AlertType::Ok
    }
}

/// Evaluate one product given its current stock
pub fn evaluate_product(product: &Product, current_stock: Decimal, settings: &AlertSettings) -> StockAlert {
    let thresholds = settings.thresholds_for(product.unit_type_id);
    StockAlert {
        product_id: product.id,
        product_name: product.name.clone(),
        godown_id: product.godown_id,
        unit_type_id: product.unit_type_id,
        current_stock,
        alert_type: classify(current_stock, thresholds),
        empty_threshold: thresholds.empty_threshold,
        low_threshold: thresholds.low_threshold,
    }
}

/// Evaluate every product; godowns without stored settings use the defaults
pub fn evaluate_all<'a, I>(products: I, settings_by_godown: &HashMap<Uuid, AlertSettings>) -> Vec<StockAlert>
where
    I: IntoIterator<Item = (&'a Product, Decimal)>,
{
    let defaults = AlertSettings::default();
    products
        .into_iter()
        .map(|(product, current_stock)| {
            let settings = settings_by_godown.get(&product.godown_id).unwrap_or(&defaults);
            evaluate_product(product, current_stock, settings)
        })
        .collect()
}

/// Count `(empty, low)` alerts
pub fn count_by_level(alerts: &[StockAlert]) -> (usize, usize) {
    alerts.iter().fold((0, 0), |(empty, low), alert| match alert.alert_type {
        AlertType::Empty => (empty + 1, low),
        AlertType::Low => (empty, low + 1),
        AlertType::Ok => (empty, low),
    })
}
