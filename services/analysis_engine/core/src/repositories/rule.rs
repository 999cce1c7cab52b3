//! Rule Store repository trait.

use async_trait::async_trait;

use crate::domains::rule::Rule;
use crate::error::Result;

/// Loads the configured rules the engine resolves over a snapshot.
///
/// Implementations own schema validation at store/activation time: malformed
/// rules are marked inactive and excluded, so `active_rules` only ever
/// returns rules that already passed `rules::schema::validate` and the
/// engine never has to re-validate on every evaluation.
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// All `is_active` rules applicable to `tenant_id`, in no particular
    /// order — callers run them through `rules::active_rules_in_order`
    /// before evaluating.
    async fn active_rules(&self, tenant_id: &str) -> Result<Vec<Rule>>;
}
