//! Product catalog service
//!
//! Products carry the opening stock every running balance starts from, so
//! editing it is checked against the full movement history.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use shared::ledger::current_balance;
use shared::{validate_figure, validate_opening_stock, Product, ProductWithStock};

use crate::error::{AppError, AppResult};
use crate::services::movement::movements_for_product;
use crate::services::{GodownService, InventoryService};

pub(crate) const PRODUCT_COLUMNS: &str = "id, godown_id, company_id, unit_type_id, name, sku, \
     opening_stock, min_stock_threshold, cost_price, selling_price, created_at, updated_at";

#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    pub godown_id: Uuid,
    pub company_id: Uuid,
    pub unit_type_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 64, message = "SKU must be at most 64 characters"))]
    pub sku: Option<String>,
    #[serde(default)]
    pub opening_stock: Decimal,
    #[serde(default)]
    pub min_stock_threshold: Decimal,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

/// Input for updating a product; the godown is fixed at creation
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductInput {
    pub company_id: Uuid,
    pub unit_type_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 64, message = "SKU must be at most 64 characters"))]
    pub sku: Option<String>,
    pub opening_stock: Decimal,
    #[serde(default)]
    pub min_stock_threshold: Decimal,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

fn check_figures(
    opening_stock: Decimal,
    min_stock_threshold: Decimal,
    cost_price: Option<Decimal>,
    selling_price: Option<Decimal>,
) -> AppResult<()> {
    let figures = [
        ("opening_stock", Some(opening_stock)),
        ("min_stock_threshold", Some(min_stock_threshold)),
        ("cost_price", cost_price),
        ("selling_price", selling_price),
    ];
    for (field, value) in figures {
        if let Some(value) = value {
            validate_figure(value).map_err(|msg| AppError::invalid(field, msg))?;
        }
    }
    Ok(())
}

/// Lock a product row for the rest of the transaction.
///
/// Every ledger mutation takes this lock first, so mutations of one product
/// run one after another.
pub(crate) async fn lock_product(
    conn: &mut PgConnection,
    uid: &str,
    product_id: Uuid,
) -> AppResult<Product> {
    let query = format!(
        "SELECT {} FROM products WHERE id = $1 AND user_id = $2 FOR UPDATE",
        PRODUCT_COLUMNS
    );
    sqlx::query_as::<_, Product>(&query)
        .bind(product_id)
        .bind(uid)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products with current stock, optionally for one godown
    pub async fn list(&self, uid: &str, godown_id: Option<Uuid>) -> AppResult<Vec<ProductWithStock>> {
        let snapshot = InventoryService::new(self.db.clone())
            .load_snapshot(uid, godown_id)
            .await?;

        Ok(snapshot
            .current_stocks()
            .map(|(product, current_stock)| ProductWithStock {
                product: product.clone(),
                current_stock,
            })
            .collect())
    }

    pub async fn get(&self, uid: &str, product_id: Uuid) -> AppResult<ProductWithStock> {
        let product = self.find(uid, product_id).await?;
        let mut conn = self.db.acquire().await?;
        let movements = movements_for_product(&mut conn, uid, product_id).await?;

        Ok(ProductWithStock {
            current_stock: current_balance(product.opening_stock, &movements),
            product,
        })
    }

    async fn find(&self, uid: &str, product_id: Uuid) -> AppResult<Product> {
        let query = format!(
            "SELECT {} FROM products WHERE id = $1 AND user_id = $2",
            PRODUCT_COLUMNS
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(product_id)
            .bind(uid)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// 404 unless the product exists and belongs to the tenant
    pub async fn ensure_owned(&self, uid: &str, product_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1 AND user_id = $2)",
        )
        .bind(product_id)
        .bind(uid)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    /// Company and unit type must both sit in the product's godown
    async fn check_references(
        conn: &mut PgConnection,
        uid: &str,
        godown_id: Uuid,
        company_id: Uuid,
        unit_type_id: Uuid,
    ) -> AppResult<()> {
        let (company_ok, unit_type_ok) = sqlx::query_as::<_, (bool, bool)>(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM companies WHERE id = $1 AND godown_id = $3 AND user_id = $4),
                EXISTS(SELECT 1 FROM unit_types WHERE id = $2 AND godown_id = $3 AND user_id = $4)
            "#,
        )
        .bind(company_id)
        .bind(unit_type_id)
        .bind(godown_id)
        .bind(uid)
        .fetch_one(&mut *conn)
        .await?;

        if !company_ok {
            return Err(AppError::invalid("company_id", "Company does not belong to this godown"));
        }
        if !unit_type_ok {
            return Err(AppError::invalid(
                "unit_type_id",
                "Unit type does not belong to this godown",
            ));
        }
        Ok(())
    }

    pub async fn create(&self, uid: &str, input: CreateProductInput) -> AppResult<ProductWithStock> {
        input.validate()?;
        check_figures(
            input.opening_stock,
            input.min_stock_threshold,
            input.cost_price,
            input.selling_price,
        )?;

        GodownService::new(self.db.clone())
            .ensure_owned(uid, input.godown_id)
            .await?;
        let mut conn = self.db.acquire().await?;
        Self::check_references(&mut conn, uid, input.godown_id, input.company_id, input.unit_type_id)
            .await?;

        let query = format!(
            r#"
            INSERT INTO products (
                id, user_id, godown_id, company_id, unit_type_id, name, sku,
                opening_stock, min_stock_threshold, cost_price, selling_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(Uuid::new_v4())
            .bind(uid)
            .bind(input.godown_id)
            .bind(input.company_id)
            .bind(input.unit_type_id)
            .bind(input.name.trim())
            .bind(&input.sku)
            .bind(input.opening_stock)
            .bind(input.min_stock_threshold)
            .bind(input.cost_price)
            .bind(input.selling_price)
            .fetch_one(&mut *conn)
            .await?;

        tracing::info!("Created product {} in godown {}", product.id, product.godown_id);

        Ok(ProductWithStock {
            current_stock: product.opening_stock,
            product,
        })
    }

    /// Update a product; a new opening stock is replayed against the whole history
    pub async fn update(
        &self,
        uid: &str,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<ProductWithStock> {
        input.validate()?;
        check_figures(
            input.opening_stock,
            input.min_stock_threshold,
            input.cost_price,
            input.selling_price,
        )?;

        let mut tx = self.db.begin().await?;
        let current = lock_product(&mut *tx, uid, product_id).await?;
        Self::check_references(
            &mut *tx,
            uid,
            current.godown_id,
            input.company_id,
            input.unit_type_id,
        )
        .await?;

        let movements = movements_for_product(&mut *tx, uid, product_id).await?;
        if input.opening_stock != current.opening_stock {
            validate_opening_stock(input.opening_stock, &movements)?;
        }

        let query = format!(
            r#"
            UPDATE products
            SET company_id = $3, unit_type_id = $4, name = $5, sku = $6,
                opening_stock = $7, min_stock_threshold = $8,
                cost_price = $9, selling_price = $10, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(product_id)
            .bind(uid)
            .bind(input.company_id)
            .bind(input.unit_type_id)
            .bind(input.name.trim())
            .bind(&input.sku)
            .bind(input.opening_stock)
            .bind(input.min_stock_threshold)
            .bind(input.cost_price)
            .bind(input.selling_price)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        if product.opening_stock != current.opening_stock {
            tracing::info!(
                "Opening stock of product {} changed from {} to {}",
                product_id,
                current.opening_stock,
                product.opening_stock
            );
        }

        Ok(ProductWithStock {
            current_stock: current_balance(product.opening_stock, &movements),
            product,
        })
    }

    /// Delete a product together with its movements
    pub async fn delete(&self, uid: &str, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
            .bind(product_id)
            .bind(uid)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        tracing::info!("Deleted product {}", product_id);
        Ok(())
    }
}
