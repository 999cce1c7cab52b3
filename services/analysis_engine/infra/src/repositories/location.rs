//! PostgreSQL implementation of `LocationRepository`. The location store is
//! keyed by `(warehouse_id, code)` with a secondary index on
//! `(warehouse_id, warehouse_config_id)`.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;

use analysis_engine_core::domains::location::{Location, LocationType, StorageStructure};
use analysis_engine_core::error::{EngineError, Result};
use analysis_engine_core::repositories::location::LocationRepository;

/// PostgreSQL implementation of `LocationRepository`.
pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LocationRow {
    code: String,
    warehouse_id: String,
    warehouse_config_id: Option<String>,
    location_type: String,
    capacity: i32,
    zone: String,
    pattern: Option<String>,
    allowed_products: Vec<String>,
    special_requirements: serde_json::Value,
    structure_aisle: Option<i32>,
    structure_rack: Option<String>,
    structure_position: Option<i32>,
    structure_level: Option<String>,
    is_active: bool,
}

fn parse_location_type(raw: &str) -> Result<LocationType> {
    match raw {
        "STORAGE" => Ok(LocationType::Storage),
        "RECEIVING" => Ok(LocationType::Receiving),
        "STAGING" => Ok(LocationType::Staging),
        "DOCK" => Ok(LocationType::Dock),
        "TRANSITIONAL" => Ok(LocationType::Transitional),
        other => Err(EngineError::InputMalformed(format!("unknown location_type {other:?}"))),
    }
}

fn special_requirements_map(value: serde_json::Value) -> BTreeMap<String, String> {
    value
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

impl TryFrom<LocationRow> for Location {
    type Error = EngineError;

    fn try_from(row: LocationRow) -> Result<Location> {
        let location_type = parse_location_type(&row.location_type)?;
        let structure = match (row.structure_aisle, row.structure_rack, row.structure_position, row.structure_level) {
            (Some(aisle), Some(rack), Some(position), Some(level)) => {
                Some(StorageStructure { aisle: aisle as u32, rack, position: position as u32, level })
            },
            _ => None,
        };
        Ok(Location {
            code: row.code,
            warehouse_id: row.warehouse_id,
            warehouse_config_id: row.warehouse_config_id,
            location_type,
            capacity: row.capacity.max(0) as u32,
            zone: row.zone,
            pattern: row.pattern,
            allowed_products: row.allowed_products,
            special_requirements: special_requirements_map(row.special_requirements),
            structure,
            is_active: row.is_active,
        })
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT
                code, warehouse_id, warehouse_config_id, location_type, capacity, zone,
                pattern, allowed_products, special_requirements,
                structure_aisle, structure_rack, structure_position, structure_level,
                is_active
            FROM locations
            WHERE warehouse_id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EngineError::CatalogUnavailable(e.to_string()))?;

        rows.into_iter().map(Location::try_from).collect()
    }

    async fn active_config_id(&self, tenant_id: &str) -> Result<Option<String>> {
        let id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM warehouse_configs
            WHERE warehouse_id = $1 AND is_active = true
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EngineError::CatalogUnavailable(e.to_string()))?;
        Ok(id)
    }
}
