//! Supplier company service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use shared::Company;

use crate::error::{empty_if_missing, in_use_on_reference, AppError, AppResult};
use crate::services::GodownService;

#[derive(Clone)]
pub struct CompanyService {
    db: PgPool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyInput {
    pub godown_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
}

impl CompanyService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, uid: &str, godown_id: Option<Uuid>) -> AppResult<Vec<Company>> {
        let result = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, godown_id, name, created_at
            FROM companies
            WHERE user_id = $1 AND ($2::uuid IS NULL OR godown_id = $2)
            ORDER BY name
            "#,
        )
        .bind(uid)
        .bind(godown_id)
        .fetch_all(&self.db)
        .await;

        empty_if_missing(result, "companies")
    }

    pub async fn get(&self, uid: &str, company_id: Uuid) -> AppResult<Company> {
        sqlx::query_as::<_, Company>(
            "SELECT id, godown_id, name, created_at FROM companies WHERE id = $1 AND user_id = $2",
        )
        .bind(company_id)
        .bind(uid)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company".to_string()))
    }

    pub async fn create(&self, uid: &str, input: CreateCompanyInput) -> AppResult<Company> {
        input.validate()?;
        GodownService::new(self.db.clone())
            .ensure_owned(uid, input.godown_id)
            .await?;

        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (id, user_id, godown_id, name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, godown_id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(uid)
        .bind(input.godown_id)
        .bind(input.name.trim())
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created company {} in godown {}", company.id, company.godown_id);
        Ok(company)
    }

    pub async fn update(
        &self,
        uid: &str,
        company_id: Uuid,
        input: UpdateCompanyInput,
    ) -> AppResult<Company> {
        input.validate()?;

        sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET name = $3
            WHERE id = $1 AND user_id = $2
            RETURNING id, godown_id, name, created_at
            "#,
        )
        .bind(company_id)
        .bind(uid)
        .bind(input.name.trim())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company".to_string()))
    }

    pub async fn delete(&self, uid: &str, company_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1 AND user_id = $2")
            .bind(company_id)
            .bind(uid)
            .execute(&self.db)
            .await
            .map_err(|e| in_use_on_reference(e, "Company"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Company".to_string()));
        }
        Ok(())
    }
}
