//! Alert threshold settings and stock alert evaluation

use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use shared::alerts::evaluate_all;
use shared::{validate_alert_settings, AlertSettings, AlertType, StockAlert};

use crate::error::{is_missing_table, AppError, AppResult};
use crate::services::{GodownService, InventoryService, UnitTypeService};

#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

impl AlertService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Stored settings of a godown, or the defaults when none were saved
    pub async fn get_settings(&self, uid: &str, godown_id: Uuid) -> AppResult<AlertSettings> {
        GodownService::new(self.db.clone())
            .ensure_owned(uid, godown_id)
            .await?;

        let result = sqlx::query_scalar::<_, Json<AlertSettings>>(
            "SELECT settings FROM alert_settings WHERE user_id = $1 AND godown_id = $2",
        )
        .bind(uid)
        .bind(godown_id)
        .fetch_optional(&self.db)
        .await;

        match result {
            Ok(stored) => Ok(stored.map(|Json(settings)| settings).unwrap_or_default()),
            Err(err) if is_missing_table(&err) => {
                tracing::warn!("Table alert_settings is missing, using default thresholds");
                Ok(AlertSettings::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Validate and upsert a godown's settings
    pub async fn save_settings(
        &self,
        uid: &str,
        godown_id: Uuid,
        settings: AlertSettings,
    ) -> AppResult<AlertSettings> {
        GodownService::new(self.db.clone())
            .ensure_owned(uid, godown_id)
            .await?;

        let unit_types = UnitTypeService::new(self.db.clone())
            .ids_for_godown(uid, godown_id)
            .await?;
        validate_alert_settings(&settings, &unit_types)
            .map_err(|msg| AppError::invalid("settings", msg))?;

        sqlx::query(
            r#"
            INSERT INTO alert_settings (user_id, godown_id, settings, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, godown_id)
            DO UPDATE SET settings = EXCLUDED.settings, updated_at = NOW()
            "#,
        )
        .bind(uid)
        .bind(godown_id)
        .bind(Json(&settings))
        .execute(&self.db)
        .await?;

        tracing::info!("Saved alert settings for godown {}", godown_id);
        Ok(settings)
    }

    /// Every stored settings document of the tenant, keyed by godown
    pub async fn settings_by_godown(&self, uid: &str) -> AppResult<HashMap<Uuid, AlertSettings>> {
        let result = sqlx::query_as::<_, (Uuid, Json<AlertSettings>)>(
            "SELECT godown_id, settings FROM alert_settings WHERE user_id = $1",
        )
        .bind(uid)
        .fetch_all(&self.db)
        .await;

        match result {
            Ok(rows) => Ok(rows
                .into_iter()
                .map(|(godown_id, Json(settings))| (godown_id, settings))
                .collect()),
            Err(err) if is_missing_table(&err) => {
                tracing::warn!("Table alert_settings is missing, using default thresholds");
                Ok(HashMap::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// EMPTY and LOW alerts for the tenant's products, EMPTY first
    pub async fn active_alerts(&self, uid: &str, godown_id: Option<Uuid>) -> AppResult<Vec<StockAlert>> {
        if let Some(godown_id) = godown_id {
            GodownService::new(self.db.clone())
                .ensure_owned(uid, godown_id)
                .await?;
        }

        let snapshot = InventoryService::new(self.db.clone())
            .load_snapshot(uid, godown_id)
            .await?;
        let settings = self.settings_by_godown(uid).await?;

        let mut alerts: Vec<StockAlert> = evaluate_all(snapshot.current_stocks(), &settings)
            .into_iter()
            .filter(|alert| alert.alert_type != AlertType::Ok)
            .collect();
        alerts.sort_by_key(|alert| alert.alert_type != AlertType::Empty);

        Ok(alerts)
    }
}
