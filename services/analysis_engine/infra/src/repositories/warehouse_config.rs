//! PostgreSQL implementation of `WarehouseConfigRepository`. The config
//! store is keyed by `id`, with one `is_active` config per
//! `(warehouse_id, user_id)`.

use async_trait::async_trait;
use sqlx::PgPool;

use analysis_engine_core::domains::location::LocationType;
use analysis_engine_core::domains::warehouse_config::{SpecialArea, WarehouseConfig};
use analysis_engine_core::error::{EngineError, Result};
use analysis_engine_core::repositories::warehouse_config::WarehouseConfigRepository;

pub struct PgWarehouseConfigRepository {
    pool: PgPool,
}

impl PgWarehouseConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct WarehouseConfigRow {
    id: String,
    warehouse_id: String,
    user_id: String,
    aisles: i32,
    racks: i32,
    positions: i32,
    levels: i32,
    level_names: Vec<String>,
    default_capacity: i32,
    bidimensional: bool,
    special_areas: serde_json::Value,
    is_active: bool,
}

fn parse_special_areas(value: serde_json::Value) -> Result<Vec<SpecialArea>> {
    let Some(arr) = value.as_array() else { return Ok(Vec::new()) };
    arr.iter()
        .map(|entry| {
            let code = entry
                .get("code")
                .and_then(|v| v.as_str())
                .ok_or_else(|| EngineError::InputMalformed("special_areas entry missing `code`".to_string()))?
                .to_string();
            let type_raw = entry
                .get("type")
                .and_then(|v| v.as_str())
                .ok_or_else(|| EngineError::InputMalformed("special_areas entry missing `type`".to_string()))?;
            let location_type = match type_raw {
                "STORAGE" => LocationType::Storage,
                "RECEIVING" => LocationType::Receiving,
                "STAGING" => LocationType::Staging,
                "DOCK" => LocationType::Dock,
                "TRANSITIONAL" => LocationType::Transitional,
                other => return Err(EngineError::InputMalformed(format!("unknown special_area type {other:?}"))),
            };
            let capacity = entry.get("capacity").and_then(|v| v.as_u64()).unwrap_or(1) as u32;
            let zone = entry.get("zone").and_then(|v| v.as_str()).unwrap_or("GENERAL").to_string();
            Ok(SpecialArea { code, location_type, capacity, zone })
        })
        .collect()
}

impl TryFrom<WarehouseConfigRow> for WarehouseConfig {
    type Error = EngineError;

    fn try_from(row: WarehouseConfigRow) -> Result<WarehouseConfig> {
        Ok(WarehouseConfig {
            id: row.id,
            warehouse_id: row.warehouse_id,
            user_id: row.user_id,
            aisles: row.aisles.max(0) as u32,
            racks: row.racks.max(0) as u32,
            positions: row.positions.max(0) as u32,
            levels: row.levels.max(0) as u32,
            level_names: row.level_names,
            default_capacity: row.default_capacity.max(0) as u32,
            bidimensional: row.bidimensional,
            special_areas: parse_special_areas(row.special_areas)?,
            is_active: row.is_active,
        })
    }
}

#[async_trait]
impl WarehouseConfigRepository for PgWarehouseConfigRepository {
    async fn find_by_id(&self, config_id: &str) -> Result<Option<WarehouseConfig>> {
        let row = sqlx::query_as::<_, WarehouseConfigRow>(
            r#"
            SELECT id, warehouse_id, user_id, aisles, racks, positions, levels, level_names,
                   default_capacity, bidimensional, special_areas, is_active
            FROM warehouse_configs
            WHERE id = $1
            "#,
        )
        .bind(config_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EngineError::CatalogUnavailable(e.to_string()))?;

        row.map(WarehouseConfig::try_from).transpose()
    }

    async fn find_active_for_tenant(&self, tenant_id: &str) -> Result<Option<WarehouseConfig>> {
        let row = sqlx::query_as::<_, WarehouseConfigRow>(
            r#"
            SELECT id, warehouse_id, user_id, aisles, racks, positions, levels, level_names,
                   default_capacity, bidimensional, special_areas, is_active
            FROM warehouse_configs
            WHERE warehouse_id = $1 AND is_active = true
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EngineError::CatalogUnavailable(e.to_string()))?;

        row.map(WarehouseConfig::try_from).transpose()
    }
}
