//! Evaluator Registry and the per-rule-kind evaluators.

pub mod data_integrity;
pub mod invalid_location;
pub mod location_mapping_error;
pub mod lot_stragglers;
pub mod overcapacity;
pub mod stagnant;
pub mod temperature_zone;

use crate::catalog::CatalogView;
use crate::domains::anomaly::Anomaly;
use crate::domains::inventory_row::Snapshot;
use crate::domains::rule::{Rule, RuleType};
use crate::domains::warehouse_config::WarehouseConfig;
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// How many rows an evaluator's inner loop processes between cancellation
/// checks.
pub const CANCELLATION_CHECK_STRIDE: usize = 500;

/// Everything an evaluator needs besides the rule itself and the snapshot.
pub struct EvalContext<'a> {
    pub tenant: &'a str,
    pub catalog: &'a CatalogView,
    /// The tenant's active warehouse config, when one is selected. Used by
    /// evaluators that decode structural bounds (INVALID_LOCATION's
    /// "impossible" check, LOCATION_MAPPING_ERROR).
    pub warehouse_config: Option<&'a WarehouseConfig>,
    pub now: DateTime<Utc>,
    pub cancel: &'a CancellationToken,
}

impl<'a> EvalContext<'a> {
    /// Returns `true` if cancellation was requested; evaluators should stop
    /// and discard partial work when this is hit.
    pub fn cancelled_at(&self, row_index: usize) -> bool {
        row_index % CANCELLATION_CHECK_STRIDE == 0 && self.cancel.is_cancelled()
    }
}

/// One evaluator per `rule_type`. Evaluators are stateless and
/// deterministic given the same inputs.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, rule: &Rule, snapshot: &Snapshot, ctx: &EvalContext<'_>) -> Result<Vec<Anomaly>>;
}

/// Evaluator for rule types with no registered implementation. Emits no
/// anomalies and is logged once per snapshot by the caller.
pub struct NullEvaluator;

impl Evaluator for NullEvaluator {
    fn evaluate(&self, _rule: &Rule, _snapshot: &Snapshot, _ctx: &EvalContext<'_>) -> Result<Vec<Anomaly>> {
        Ok(Vec::new())
    }
}

/// Maps `rule_type` to its evaluator.
pub struct Registry {
    evaluators: BTreeMap<RuleType, Box<dyn Evaluator>>,
    null_evaluator: NullEvaluator,
}

impl Default for Registry {
    fn default() -> Self {
        let mut evaluators: BTreeMap<RuleType, Box<dyn Evaluator>> = BTreeMap::new();
        evaluators.insert(RuleType::StagnantPallets, Box::new(stagnant::StagnantPalletsEvaluator));
        evaluators.insert(RuleType::LocationSpecificStagnant, Box::new(stagnant::LocationSpecificStagnantEvaluator));
        evaluators.insert(RuleType::UncoordinatedLots, Box::new(lot_stragglers::UncoordinatedLotsEvaluator));
        evaluators.insert(RuleType::Overcapacity, Box::new(overcapacity::OvercapacityEvaluator));
        evaluators.insert(RuleType::InvalidLocation, Box::new(invalid_location::InvalidLocationEvaluator));
        evaluators.insert(RuleType::DataIntegrity, Box::new(data_integrity::DataIntegrityEvaluator));
        evaluators.insert(RuleType::TemperatureZoneMismatch, Box::new(temperature_zone::TemperatureZoneMismatchEvaluator));
        evaluators.insert(RuleType::LocationMappingError, Box::new(location_mapping_error::LocationMappingErrorEvaluator));
        Self { evaluators, null_evaluator: NullEvaluator }
    }
}

impl Registry {
    pub fn get(&self, rule_type: RuleType) -> &dyn Evaluator {
        self.evaluators.get(&rule_type).map(|b| b.as_ref()).unwrap_or(&self.null_evaluator)
    }
}
