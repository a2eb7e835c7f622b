//! Warehouse (godown) and its descriptive children

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical or logical stock location owned by a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Godown {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Unit of measure used by products in a godown
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UnitType {
    pub id: Uuid,
    pub godown_id: Uuid,
    pub name: String,
    /// Loose/fractional quantities are meaningful for this unit.
    /// Informational only; ledger arithmetic is always decimal.
    pub has_open_pieces: bool,
    pub created_at: DateTime<Utc>,
}

/// Supplier or brand a product belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Company {
    pub id: Uuid,
    pub godown_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
