//! Unit type management service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use shared::UnitType;

use crate::error::{empty_if_missing, in_use_on_reference, AppError, AppResult};
use crate::services::GodownService;

#[derive(Clone)]
pub struct UnitTypeService {
    db: PgPool,
}

/// Input for creating a unit type
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUnitTypeInput {
    pub godown_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    pub has_open_pieces: bool,
}

/// Input for updating a unit type
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUnitTypeInput {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    pub has_open_pieces: bool,
}

impl UnitTypeService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List unit types, optionally for one godown
    pub async fn list(&self, uid: &str, godown_id: Option<Uuid>) -> AppResult<Vec<UnitType>> {
        let result = sqlx::query_as::<_, UnitType>(
            r#"
            SELECT id, godown_id, name, has_open_pieces, created_at
            FROM unit_types
            WHERE user_id = $1 AND ($2::uuid IS NULL OR godown_id = $2)
            ORDER BY name
            "#,
        )
        .bind(uid)
        .bind(godown_id)
        .fetch_all(&self.db)
        .await;

        empty_if_missing(result, "unit_types")
    }

    pub async fn get(&self, uid: &str, unit_type_id: Uuid) -> AppResult<UnitType> {
        sqlx::query_as::<_, UnitType>(
            r#"
            SELECT id, godown_id, name, has_open_pieces, created_at
            FROM unit_types
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(unit_type_id)
        .bind(uid)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Unit type".to_string()))
    }

    pub async fn create(&self, uid: &str, input: CreateUnitTypeInput) -> AppResult<UnitType> {
        input.validate()?;
        GodownService::new(self.db.clone())
            .ensure_owned(uid, input.godown_id)
            .await?;

        let unit_type = sqlx::query_as::<_, UnitType>(
            r#"
            INSERT INTO unit_types (id, user_id, godown_id, name, has_open_pieces)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, godown_id, name, has_open_pieces, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(uid)
        .bind(input.godown_id)
        .bind(input.name.trim())
        .bind(input.has_open_pieces)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Created unit type {} in godown {}",
            unit_type.id,
            unit_type.godown_id
        );
        Ok(unit_type)
    }

    pub async fn update(
        &self,
        uid: &str,
        unit_type_id: Uuid,
        input: UpdateUnitTypeInput,
    ) -> AppResult<UnitType> {
        input.validate()?;

        sqlx::query_as::<_, UnitType>(
            r#"
            UPDATE unit_types
            SET name = $3, has_open_pieces = $4
            WHERE id = $1 AND user_id = $2
            RETURNING id, godown_id, name, has_open_pieces, created_at
            "#,
        )
        .bind(unit_type_id)
        .bind(uid)
        .bind(input.name.trim())
        .bind(input.has_open_pieces)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Unit type".to_string()))
    }

    /// Delete a unit type; refused while products still use it
    pub async fn delete(&self, uid: &str, unit_type_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM unit_types WHERE id = $1 AND user_id = $2")
            .bind(unit_type_id)
            .bind(uid)
            .execute(&self.db)
            .await
            .map_err(|e| in_use_on_reference(e, "Unit type"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Unit type".to_string()));
        }
        Ok(())
    }

    /// Ids of the godown's unit types, for alert override validation
    pub async fn ids_for_godown(&self, uid: &str, godown_id: Uuid) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM unit_types WHERE user_id = $1 AND godown_id = $2",
        )
        .bind(uid)
        .bind(godown_id)
        .fetch_all(&self.db)
        .await?;
        Ok(ids)
    }
}
