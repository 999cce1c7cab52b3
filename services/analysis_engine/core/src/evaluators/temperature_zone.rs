//! TEMPERATURE_ZONE_MISMATCH evaluator.

use super::{EvalContext, Evaluator};
use crate::domains::anomaly::Anomaly;
use crate::domains::inventory_row::Snapshot;
use crate::domains::rule::Rule;
use crate::error::Result;
use crate::normalize::glob_match;
use serde_json::json;

pub struct TemperatureZoneMismatchEvaluator;

impl Evaluator for TemperatureZoneMismatchEvaluator {
    fn evaluate(&self, rule: &Rule, snapshot: &Snapshot, ctx: &EvalContext<'_>) -> Result<Vec<Anomaly>> {
        let patterns = rule.condition_str_list("product_patterns");
        let prohibited_zones = rule.condition_str_list("prohibited_zones");
        let min_minutes = rule.condition_f64("time_threshold_minutes");

        let mut anomalies = Vec::new();
        for (idx, row) in snapshot.rows.iter().enumerate() {
            if ctx.cancelled_at(idx) {
                return Err(crate::error::EngineError::Cancelled);
            }
            let Some(loc) = ctx.catalog.resolve(ctx.tenant, &row.location_code) else {
                continue;
            };
            if !prohibited_zones.contains(&loc.zone) {
                continue;
            }
            let description = row.description.to_ascii_uppercase();
            let Some(matched_pattern) = patterns.iter().find(|p| glob_match(&p.to_ascii_uppercase(), &description)) else {
                continue;
            };
            if let Some(minutes) = min_minutes {
                let elapsed_minutes = (ctx.now - row.creation_date).num_seconds() as f64 / 60.0;
                if elapsed_minutes < minutes {
                    continue;
                }
            }
            anomalies.push(Anomaly {
                pallet_id: row.pallet_id.clone(),
                location_code: loc.code.clone(),
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                rule_type: rule.rule_type.to_string(),
                priority: rule.priority,
                category: rule.category,
                precedence_level: rule.precedence_level,
                details: json!({ "matched_pattern": matched_pattern, "zone": loc.zone }),
                correlated_anomaly_ids: Vec::new(),
            });
        }
        Ok(anomalies)
    }
}
