//! OVERCAPACITY evaluator.

use super::{EvalContext, Evaluator};
use crate::domains::anomaly::Anomaly;
use crate::domains::inventory_row::{InventoryRow, Snapshot};
use crate::domains::location::{Location, LocationType};
use crate::domains::rule::Rule;
use crate::error::Result;
use serde_json::json;
use std::collections::BTreeMap;

pub struct OvercapacityEvaluator;

impl OvercapacityEvaluator {
    fn in_scope(rule: &Rule, loc: &Location, types: &[LocationType], zones: &[String]) -> bool {
        if rule.condition_bool("check_all_locations").unwrap_or(false) {
            return true;
        }
        (!types.is_empty() && types.contains(&loc.location_type)) || (!zones.is_empty() && zones.contains(&loc.zone))
    }
}

impl Evaluator for OvercapacityEvaluator {
    fn evaluate(&self, rule: &Rule, snapshot: &Snapshot, ctx: &EvalContext<'_>) -> Result<Vec<Anomaly>> {
        let types: Vec<LocationType> = rule
            .condition_str_list("location_types")
            .iter()
            .filter_map(|s| serde_json::from_value(json!(s)).ok())
            .collect();
        let zones = rule.condition_str_list("zones");

        let mut groups: BTreeMap<String, Vec<&InventoryRow>> = BTreeMap::new();
        for (idx, row) in snapshot.rows.iter().enumerate() {
            if ctx.cancelled_at(idx) {
                return Err(crate::error::EngineError::Cancelled);
            }
            let Some(loc) = ctx.catalog.resolve(ctx.tenant, &row.location_code) else {
                continue;
            };
            if !Self::in_scope(rule, loc, &types, &zones) {
                continue;
            }
            groups.entry(loc.code.clone()).or_default().push(row);
        }

        let mut anomalies = Vec::new();
        for (code, mut rows) in groups {
            let Some(loc) = ctx.catalog.get_by_code(ctx.tenant, &code) else {
                continue;
            };
            if rows.len() <= loc.capacity as usize {
                continue;
            }
            let excess_count = rows.len() - loc.capacity as usize;
            rows.sort_by(|a, b| b.creation_date.cmp(&a.creation_date).then_with(|| a.pallet_id.cmp(&b.pallet_id)));
            for row in rows.into_iter().take(excess_count) {
                anomalies.push(Anomaly {
                    pallet_id: row.pallet_id.clone(),
                    location_code: code.clone(),
                    rule_id: rule.id.clone(),
                    rule_name: rule.name.clone(),
                    rule_type: rule.rule_type.to_string(),
                    priority: rule.priority,
                    category: rule.category,
                    precedence_level: rule.precedence_level,
                    details: json!({ "capacity": loc.capacity, "excess_count": excess_count }),
                    correlated_anomaly_ids: Vec::new(),
                });
            }
        }
        Ok(anomalies)
    }
}
