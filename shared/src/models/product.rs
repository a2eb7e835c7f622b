//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stocked product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: Uuid,
    pub godown_id: Uuid,
    pub company_id: Uuid,
    pub unit_type_id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    /// Balance before any recorded movement; the base of every running balance
    pub opening_stock: Decimal,
    pub min_stock_threshold: Decimal,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product together with its freshly computed stock
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithStock {
    #[serde(flatten)]
    pub product: Product,
    pub current_stock: Decimal,
}
