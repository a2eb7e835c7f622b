//! Stock movement ledger service
//!
//! Every mutation runs inside one transaction that locks the product row,
//! reads the product's history, asks the validator whether the resulting
//! timeline stays non-negative, and only then writes.

use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared::{validate_mutation, LedgerMutation, MovementDraft, StockMovement};

use crate::error::{empty_if_missing, AppError, AppResult};
use crate::services::product::lock_product;
use crate::services::ProductService;

pub(crate) const MOVEMENT_COLUMNS: &str =
    "id, product_id, movement_date, movement_type, quantity, note, created_at, created_by";

/// Ledger order: by date, same-day entries by time of entry
pub(crate) const LEDGER_ORDER: &str = "ORDER BY movement_date, created_at";

/// Movement ledger service
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
}

/// Input for recording a movement
#[derive(Debug, Deserialize)]
pub struct CreateMovementInput {
    pub product_id: Uuid,
    #[serde(flatten)]
    pub draft: MovementDraft,
}

/// A product's movements in ledger order
pub(crate) async fn movements_for_product(
    conn: &mut PgConnection,
    uid: &str,
    product_id: Uuid,
) -> Result<Vec<StockMovement>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM stock_movements WHERE product_id = $1 AND user_id = $2 {}",
        MOVEMENT_COLUMNS, LEDGER_ORDER
    );
    sqlx::query_as::<_, StockMovement>(&query)
        .bind(product_id)
        .bind(uid)
        .fetch_all(&mut *conn)
        .await
}

fn check_draft(draft: &MovementDraft) -> AppResult<()> {
    draft.validate().map_err(|msg| {
        let field = if msg.starts_with("Quantity") { "quantity" } else { "note" };
        AppError::invalid(field, msg)
    })
}

impl MovementService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All movements of a product, oldest first
    pub async fn list(&self, uid: &str, product_id: Uuid) -> AppResult<Vec<StockMovement>> {
        ProductService::new(self.db.clone())
            .ensure_owned(uid, product_id)
            .await?;

        let mut conn = self.db.acquire().await?;
        let result = movements_for_product(&mut conn, uid, product_id).await;

        empty_if_missing(result, "stock_movements")
    }

    /// Record a movement if the product's stock stays non-negative at every date
    pub async fn create(&self, uid: &str, input: CreateMovementInput) -> AppResult<StockMovement> {
        check_draft(&input.draft)?;

        let mut tx = self.db.begin().await?;
        let product = lock_product(&mut *tx, uid, input.product_id).await?;
        let existing = movements_for_product(&mut *tx, uid, product.id).await?;

        validate_mutation(
            product.opening_stock,
            &existing,
            LedgerMutation::Create(&input.draft),
        )?;

        let query = format!(
            r#"
            INSERT INTO stock_movements (
                id, user_id, product_id, movement_date, movement_type, quantity, note, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            MOVEMENT_COLUMNS
        );
        let movement = sqlx::query_as::<_, StockMovement>(&query)
            .bind(Uuid::new_v4())
            .bind(uid)
            .bind(product.id)
            .bind(input.draft.movement_date)
            .bind(input.draft.movement_type.as_str())
            .bind(input.draft.quantity)
            .bind(&input.draft.note)
            .bind(uid)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Recorded {} movement {} of {} for product {}",
            movement.movement_type,
            movement.id,
            movement.quantity,
            product.id
        );
        Ok(movement)
    }

    /// Replace a movement's date, type, quantity and note
    pub async fn update(
        &self,
        uid: &str,
        movement_id: Uuid,
        draft: MovementDraft,
    ) -> AppResult<StockMovement> {
        check_draft(&draft)?;

        let mut tx = self.db.begin().await?;
        let product_id = self.product_of(&mut *tx, uid, movement_id).await?;
        let product = lock_product(&mut *tx, uid, product_id).await?;
        let existing = movements_for_product(&mut *tx, uid, product.id).await?;

        // Re-read under the lock; a concurrent delete may have won
        let original = existing
            .iter()
            .find(|m| m.id == movement_id)
            .ok_or_else(|| AppError::NotFound("Stock movement".to_string()))?;

        validate_mutation(
            product.opening_stock,
            &existing,
            LedgerMutation::Update {
                original,
                draft: &draft,
            },
        )?;

        let query = format!(
            r#"
            UPDATE stock_movements
            SET movement_date = $3, movement_type = $4, quantity = $5, note = $6
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            MOVEMENT_COLUMNS
        );
        let movement = sqlx::query_as::<_, StockMovement>(&query)
            .bind(movement_id)
            .bind(uid)
            .bind(draft.movement_date)
            .bind(draft.movement_type.as_str())
            .bind(draft.quantity)
            .bind(&draft.note)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Updated movement {} of product {} to {} {}",
            movement.id,
            product.id,
            movement.movement_type,
            movement.quantity
        );
        Ok(movement)
    }

    /// Delete a movement unless later balances depend on it
    pub async fn delete(&self, uid: &str, movement_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        let product_id = self.product_of(&mut *tx, uid, movement_id).await?;
        let product = lock_product(&mut *tx, uid, product_id).await?;
        let existing = movements_for_product(&mut *tx, uid, product.id).await?;

        let target = existing
            .iter()
            .find(|m| m.id == movement_id)
            .ok_or_else(|| AppError::NotFound("Stock movement".to_string()))?;

        validate_mutation(product.opening_stock, &existing, LedgerMutation::Delete(target))?;

        sqlx::query("DELETE FROM stock_movements WHERE id = $1 AND user_id = $2")
            .bind(movement_id)
            .bind(uid)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Deleted {} movement {} of product {}",
            target.movement_type,
            movement_id,
            product.id
        );
        Ok(())
    }

    /// Owning product of a movement; 404 for unknown or foreign movements
    async fn product_of(
        &self,
        conn: &mut PgConnection,
        uid: &str,
        movement_id: Uuid,
    ) -> AppResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT product_id FROM stock_movements WHERE id = $1 AND user_id = $2",
        )
        .bind(movement_id)
        .bind(uid)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock movement".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{cleanup, seed_product, test_pool};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::MovementType;

    fn draft(quantity: i64, note: Option<String>) -> MovementDraft {
        MovementDraft {
            movement_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            movement_type: MovementType::In,
            quantity: Decimal::from(quantity),
            note,
        }
    }

    #[test]
    fn test_zero_quantity_names_quantity_field() {
        match check_draft(&draft(0, None)) {
            Err(AppError::InvalidPayload { field, .. }) => {
                assert_eq!(field.as_deref(), Some("quantity"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_long_note_names_note_field() {
        match check_draft(&draft(1, Some("n".repeat(501)))) {
            Err(AppError::InvalidPayload { field, .. }) => assert_eq!(field.as_deref(), Some("note")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_create_input_reads_flat_body() {
        let body = serde_json::json!({
            "product_id": "7f1c3c1e-4a8b-4c53-9d0e-2f7a1d3b5c6e",
            "movement_date": "2024-01-05",
            "type": "OUT",
            "quantity": "2.5",
            "note": "dispatch"
        });
        let input: CreateMovementInput = serde_json::from_value(body).unwrap();
        assert_eq!(input.draft.movement_type, MovementType::Out);
        assert_eq!(input.draft.quantity, Decimal::new(25, 1));
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_list_returns_ledger_order() {
        let db = test_pool(2).await;
        let seeded = seed_product(&db, Decimal::from(10)).await;
        let service = MovementService::new(db.clone());

        // Entered out of date order
        for (day, movement_type) in [(5, MovementType::Out), (1, MovementType::In), (3, MovementType::Out)] {
            let mut entry = draft(1, None);
            entry.movement_date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            entry.movement_type = movement_type;
            service
                .create(
                    &seeded.uid,
                    CreateMovementInput {
                        product_id: seeded.product.id,
                        draft: entry,
                    },
                )
                .await
                .unwrap();
        }

        let listed = service.list(&seeded.uid, seeded.product.id).await.unwrap();
        let days: Vec<NaiveDate> = listed.iter().map(|m| m.movement_date).collect();
        let mut sorted = listed.clone();
        shared::ledger::sort_chronologically(&mut sorted);
        assert_eq!(listed, sorted);
        assert_eq!(days.len(), 3);
        assert!(days.windows(2).all(|w| w[0] <= w[1]));

        cleanup(&db, &seeded).await;
    }
}
