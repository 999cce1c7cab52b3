//! Location repository trait (`CatalogView`).

use async_trait::async_trait;

use crate::domains::location::Location;
use crate::error::Result;

/// Loads the locations that back one tenant's `CatalogView`.
///
/// Infrastructure provides the actual implementation (Postgres today); the
/// engine only ever sees an immutable `Vec<Location>` built once per
/// evaluation from this call, keeping the trait in `core` and the
/// implementation in `infra`.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// All locations owned by `tenant_id`, active and inactive alike —
    /// `CatalogView` itself decides visibility.
    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<Location>>;

    /// The `warehouse_config_id` currently active for `tenant_id`, if any.
    /// Used to build `CatalogView`'s `active_config_by_tenant` map.
    async fn active_config_id(&self, tenant_id: &str) -> Result<Option<String>>;
}
