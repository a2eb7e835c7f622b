//! Loads a tenant's products and full movement histories for stock computation
//!
//! Balances are never stored: every read rebuilds them from the history.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use shared::reporting::InventorySnapshot;
use shared::{Product, StockMovement};

use crate::error::{empty_if_missing, AppResult};
use crate::services::movement::{LEDGER_ORDER, MOVEMENT_COLUMNS};
use crate::services::product::PRODUCT_COLUMNS;

#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

impl InventoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Products (optionally of one godown) with their histories and display names
    pub async fn load_snapshot(
        &self,
        uid: &str,
        godown_id: Option<Uuid>,
    ) -> AppResult<InventorySnapshot> {
        let products = self.load_products(uid, godown_id).await?;
        if products.is_empty() {
            return Ok(InventorySnapshot::default());
        }

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let movements = self.load_movements(uid, &product_ids).await?;

        let company_names = self.load_names(uid, "companies").await?;
        let unit_type_names = self.load_names(uid, "unit_types").await?;

        tracing::debug!(
            "Loaded snapshot of {} products and {} movements",
            products.len(),
            movements.len()
        );

        Ok(InventorySnapshot::new(products, movements).with_names(company_names, unit_type_names))
    }

    async fn load_products(&self, uid: &str, godown_id: Option<Uuid>) -> AppResult<Vec<Product>> {
        let query = format!(
            "SELECT {} FROM products WHERE user_id = $1 AND ($2::uuid IS NULL OR godown_id = $2)",
            PRODUCT_COLUMNS
        );
        let result = sqlx::query_as::<_, Product>(&query)
            .bind(uid)
            .bind(godown_id)
            .fetch_all(&self.db)
            .await;

        empty_if_missing(result, "products")
    }

    async fn load_movements(&self, uid: &str, product_ids: &[Uuid]) -> AppResult<Vec<StockMovement>> {
        let query = format!(
            "SELECT {} FROM stock_movements WHERE user_id = $1 AND product_id = ANY($2) {}",
            MOVEMENT_COLUMNS, LEDGER_ORDER
        );
        let result = sqlx::query_as::<_, StockMovement>(&query)
            .bind(uid)
            .bind(product_ids)
            .fetch_all(&self.db)
            .await;

        empty_if_missing(result, "stock_movements")
    }

    /// `id -> name` for a name-bearing table; `table` is always a literal
    async fn load_names(&self, uid: &str, table: &'static str) -> AppResult<HashMap<Uuid, String>> {
        let query = format!("SELECT id, name FROM {} WHERE user_id = $1", table);
        let result = sqlx::query_as::<_, (Uuid, String)>(&query)
            .bind(uid)
            .fetch_all(&self.db)
            .await;

        Ok(empty_if_missing(result, table)?.into_iter().collect())
    }
}
