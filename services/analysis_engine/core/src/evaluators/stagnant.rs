//! STAGNANT_PALLETS and LOCATION_SPECIFIC_STAGNANT evaluators.

use super::{EvalContext, Evaluator};
use crate::domains::anomaly::Anomaly;
use crate::domains::inventory_row::{InventoryRow, Snapshot};
use crate::domains::location::LocationType;
use crate::domains::rule::Rule;
use crate::error::Result;
use crate::normalize::glob_match;
use chrono::{DateTime, Utc};
use serde_json::json;

/// Hours between `now` and `creation_date`, rounded to one decimal.
pub fn age_hours(now: DateTime<Utc>, creation_date: DateTime<Utc>) -> f64 {
    let raw = (now - creation_date).num_seconds() as f64 / 3600.0;
    (raw * 10.0).round() / 10.0
}

fn stagnant_anomaly(rule: &Rule, row: &InventoryRow, resolved_code: &str, age: f64) -> Anomaly {
    Anomaly {
        pallet_id: row.pallet_id.clone(),
        location_code: resolved_code.to_string(),
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        rule_type: rule.rule_type.to_string(),
        priority: rule.priority,
        category: rule.category,
        precedence_level: rule.precedence_level,
        details: json!({ "age_hours": age }),
        correlated_anomaly_ids: Vec::new(),
    }
}

/// Gated on the resolved location's type being in `location_types`.
pub struct StagnantPalletsEvaluator;

impl Evaluator for StagnantPalletsEvaluator {
    fn evaluate(&self, rule: &Rule, snapshot: &Snapshot, ctx: &EvalContext<'_>) -> Result<Vec<Anomaly>> {
        let threshold = rule.condition_f64("time_threshold_hours").unwrap_or(0.0);
        let types: Vec<LocationType> = rule
            .condition_str_list("location_types")
            .iter()
            .filter_map(|s| serde_json::from_value(json!(s)).ok())
            .collect();

        let mut anomalies = Vec::new();
        for (idx, row) in snapshot.rows.iter().enumerate() {
            if ctx.cancelled_at(idx) {
                return Err(crate::error::EngineError::Cancelled);
            }
            let Some(loc) = ctx.catalog.resolve(ctx.tenant, &row.location_code) else {
                continue;
            };
            if !types.contains(&loc.location_type) {
                continue;
            }
            let age = age_hours(ctx.now, row.creation_date);
            if age > threshold {
                anomalies.push(stagnant_anomaly(rule, row, &loc.code, age));
            }
        }
        Ok(anomalies)
    }
}

/// Gated on a glob pattern against the resolved code instead of type.
pub struct LocationSpecificStagnantEvaluator;

impl Evaluator for LocationSpecificStagnantEvaluator {
    fn evaluate(&self, rule: &Rule, snapshot: &Snapshot, ctx: &EvalContext<'_>) -> Result<Vec<Anomaly>> {
        let threshold = rule.condition_f64("time_threshold_hours").unwrap_or(0.0);
        let Some(pattern) = rule.condition_str("location_pattern").map(str::to_string) else {
            return Ok(Vec::new());
        };

        let mut anomalies = Vec::new();
        for (idx, row) in snapshot.rows.iter().enumerate() {
            if ctx.cancelled_at(idx) {
                return Err(crate::error::EngineError::Cancelled);
            }
            let Some(loc) = ctx.catalog.resolve(ctx.tenant, &row.location_code) else {
                continue;
            };
            if !glob_match(&pattern, &loc.code) {
                continue;
            }
            let age = age_hours(ctx.now, row.creation_date);
            if age > threshold {
                anomalies.push(stagnant_anomaly(rule, row, &loc.code, age));
            }
        }
        Ok(anomalies)
    }
}
