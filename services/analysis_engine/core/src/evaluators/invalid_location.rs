//! INVALID_LOCATION evaluator.
//!
//! Owns "impossible structured codes": DATA_INTEGRITY only covers
//! duplicate/corrupt identifiers.

use super::{EvalContext, Evaluator};
use crate::domains::anomaly::Anomaly;
use crate::domains::inventory_row::Snapshot;
use crate::domains::location::StorageStructure;
use crate::domains::rule::Rule;
use crate::error::Result;
use crate::normalize::{canonical, decode_structured};
use serde_json::json;

pub struct InvalidLocationEvaluator;

impl Evaluator for InvalidLocationEvaluator {
    fn evaluate(&self, rule: &Rule, snapshot: &Snapshot, ctx: &EvalContext<'_>) -> Result<Vec<Anomaly>> {
        let check_undefined = rule.condition_bool("check_undefined_locations").unwrap_or(false);
        let check_impossible = rule.condition_bool("check_impossible_locations").unwrap_or(false);

        let mut anomalies = Vec::new();
        for (idx, row) in snapshot.rows.iter().enumerate() {
            if ctx.cancelled_at(idx) {
                return Err(crate::error::EngineError::Cancelled);
            }
            let code = canonical(&row.location_code);

            // "Impossible" is checked off the decoded code directly, ahead of
            // catalog resolution: a structurally out-of-bounds code is the
            // more specific diagnosis even when it also fails to resolve.
            if check_impossible {
                if let (Some(structured), Some(config)) = (decode_structured(&code), ctx.warehouse_config) {
                    let structure = StorageStructure {
                        aisle: structured.aisle,
                        rack: structured.rack,
                        position: structured.position,
                        level: structured.level,
                    };
                    if let Some(dimension) = config.out_of_bounds_dimension(&structure) {
                        anomalies.push(Anomaly {
                            pallet_id: row.pallet_id.clone(),
                            location_code: code.clone(),
                            rule_id: rule.id.clone(),
                            rule_name: rule.name.clone(),
                            rule_type: rule.rule_type.to_string(),
                            priority: rule.priority,
                            category: rule.category,
                            precedence_level: rule.precedence_level,
                            details: json!({ "kind": "impossible", "dimension": dimension }),
                            correlated_anomaly_ids: Vec::new(),
                        });
                        continue;
                    }
                }
            }

            if check_undefined && ctx.catalog.resolve(ctx.tenant, &code).is_none() {
                anomalies.push(Anomaly {
                    pallet_id: row.pallet_id.clone(),
                    location_code: code.clone(),
                    rule_id: rule.id.clone(),
                    rule_name: rule.name.clone(),
                    rule_type: rule.rule_type.to_string(),
                    priority: rule.priority,
                    category: rule.category,
                    precedence_level: rule.precedence_level,
                    details: json!({ "kind": "undefined" }),
                    correlated_anomaly_ids: Vec::new(),
                });
            }
        }
        Ok(anomalies)
    }
}
