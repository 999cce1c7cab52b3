//! Warehouse config repository trait (`WarehouseConfig`).

use async_trait::async_trait;

use crate::domains::warehouse_config::WarehouseConfig;
use crate::error::Result;

/// Loads the warehouse config `INVALID_LOCATION`/`LOCATION_MAPPING_ERROR`
/// bound their structural checks against.
#[async_trait]
pub trait WarehouseConfigRepository: Send + Sync {
    /// The config by id, regardless of `is_active` — callers decide whether
    /// an inactive config should still gate evaluation.
    async fn find_by_id(&self, config_id: &str) -> Result<Option<WarehouseConfig>>;

    /// The single active config for a tenant, if one is selected.
    async fn find_active_for_tenant(&self, tenant_id: &str) -> Result<Option<WarehouseConfig>>;
}
