//! Domain entities for the rule engine.
//!
//! This module contains the core domain entities and business logic.
//! No infrastructure types leak in here.

pub mod anomaly;
pub mod inventory_row;
pub mod location;
pub mod report;
pub mod rule;
pub mod user_context;
pub mod warehouse_config;

/// Common trait for tenant-owned, code-addressed entities (every entity
/// lives under `(tenant_id, code)` or an equivalent composite key).
pub trait BaseEntity {
    fn tenant_id(&self) -> &str;
    fn code(&self) -> &str;
    fn is_active(&self) -> bool;

    /// Display form combining code and tenant for logs/diagnostics.
    fn display_name(&self) -> String {
        format!("{}@{}", self.code(), self.tenant_id())
    }
}
