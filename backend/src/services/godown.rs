//! Godown (warehouse) management service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use shared::Godown;

use crate::error::{empty_if_missing, AppError, AppResult};

/// Godown service for tenant-scoped warehouse CRUD
#[derive(Clone)]
pub struct GodownService {
    db: PgPool,
}

/// Input for creating or renaming a godown
#[derive(Debug, Deserialize, Validate)]
pub struct GodownInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl GodownService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List the tenant's godowns, newest first
    pub async fn list(&self, uid: &str) -> AppResult<Vec<Godown>> {
        let result = sqlx::query_as::<_, Godown>(
            r#"
            SELECT id, name, description, created_at
            FROM godowns
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(uid)
        .fetch_all(&self.db)
        .await;

        empty_if_missing(result, "godowns")
    }

    pub async fn get(&self, uid: &str, godown_id: Uuid) -> AppResult<Godown> {
        sqlx::query_as::<_, Godown>(
            r#"
            SELECT id, name, description, created_at
            FROM godowns
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(godown_id)
        .bind(uid)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Godown".to_string()))
    }

    /// 404 unless the godown exists and belongs to the tenant
    pub async fn ensure_owned(&self, uid: &str, godown_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM godowns WHERE id = $1 AND user_id = $2)",
        )
        .bind(godown_id)
        .bind(uid)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Godown".to_string()));
        }
        Ok(())
    }

    pub async fn count(&self, uid: &str) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM godowns WHERE user_id = $1")
            .bind(uid)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn create(&self, uid: &str, input: GodownInput) -> AppResult<Godown> {
        input.validate()?;

        let godown = sqlx::query_as::<_, Godown>(
            r#"
            INSERT INTO godowns (id, user_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(uid)
        .bind(input.name.trim())
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created godown {}", godown.id);
        Ok(godown)
    }

    pub async fn update(&self, uid: &str, godown_id: Uuid, input: GodownInput) -> AppResult<Godown> {
        input.validate()?;

        sqlx::query_as::<_, Godown>(
            r#"
            UPDATE godowns
            SET name = $3, description = $4
            WHERE id = $1 AND user_id = $2
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(godown_id)
        .bind(uid)
        .bind(input.name.trim())
        .bind(&input.description)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Godown".to_string()))
    }

    /// Delete a godown; its unit types, companies, products and movements cascade
    pub async fn delete(&self, uid: &str, godown_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM godowns WHERE id = $1 AND user_id = $2")
            .bind(godown_id)
            .bind(uid)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Godown".to_string()));
        }

        tracing::info!("Deleted godown {}", godown_id);
        Ok(())
    }
}
