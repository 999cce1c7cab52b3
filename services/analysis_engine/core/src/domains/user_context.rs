//! Caller context (`UserContext`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The acting user and the tenants they may address, used by the context
/// resolver to narrow an ambiguous snapshot to one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub accessible_tenants: BTreeSet<String>,
    pub default_tenant: Option<String>,
}
