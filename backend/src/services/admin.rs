//! Cross-tenant overview for the admin portal

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::error::{empty_if_missing, AppResult};

/// Entity counts of one tenant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TenantOverview {
    pub user_id: String,
    pub godowns: i64,
    pub products: i64,
    pub movements: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub tenant_count: usize,
    pub tenants: Vec<TenantOverview>,
}

#[derive(Clone)]
pub struct AdminService {
    db: PgPool,
}

impl AdminService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn overview(&self) -> AppResult<AdminOverview> {
        let mut tenants: BTreeMap<String, TenantOverview> = BTreeMap::new();

        for (table, column) in [
            ("godowns", Column::Godowns),
            ("products", Column::Products),
            ("stock_movements", Column::Movements),
        ] {
            for (user_id, count) in self.count_by_tenant(table).await? {
                let entry = tenants.entry(user_id.clone()).or_insert_with(|| TenantOverview {
                    user_id,
                    ..TenantOverview::default()
                });
                match column {
                    Column::Godowns => entry.godowns = count,
                    Column::Products => entry.products = count,
                    Column::Movements => entry.movements = count,
                }
            }
        }

        let tenants: Vec<TenantOverview> = tenants.into_values().collect();
        Ok(AdminOverview {
            tenant_count: tenants.len(),
            tenants,
        })
    }

    async fn count_by_tenant(&self, table: &'static str) -> AppResult<Vec<(String, i64)>> {
        let query = format!("SELECT user_id, COUNT(*) FROM {} GROUP BY user_id", table);
        let result = sqlx::query_as::<_, (String, i64)>(&query)
            .fetch_all(&self.db)
            .await;

        empty_if_missing(result, table)
    }
}

#[derive(Clone, Copy)]
enum Column {
    Godowns,
    Products,
    Movements,
}
