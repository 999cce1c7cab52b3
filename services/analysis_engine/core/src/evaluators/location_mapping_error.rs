//! LOCATION_MAPPING_ERROR evaluator.

use super::{EvalContext, Evaluator};
use crate::domains::anomaly::Anomaly;
use crate::domains::inventory_row::Snapshot;
use crate::domains::location::LocationType;
use crate::domains::rule::Rule;
use crate::error::Result;
use crate::normalize::{canonical, decode_structured, glob_match};
use serde_json::json;

pub struct LocationMappingErrorEvaluator;

impl Evaluator for LocationMappingErrorEvaluator {
    fn evaluate(&self, rule: &Rule, snapshot: &Snapshot, ctx: &EvalContext<'_>) -> Result<Vec<Anomaly>> {
        let validate_types = rule.condition_bool("validate_location_types").unwrap_or(false);
        let check_patterns = rule.condition_bool("check_pattern_consistency").unwrap_or(false);

        let mut anomalies = Vec::new();
        for (idx, row) in snapshot.rows.iter().enumerate() {
            if ctx.cancelled_at(idx) {
                return Err(crate::error::EngineError::Cancelled);
            }
            let Some(loc) = ctx.catalog.resolve(ctx.tenant, &row.location_code) else {
                continue;
            };

            if validate_types {
                if let Some(structured) = decode_structured(&loc.code) {
                    if loc.location_type != LocationType::Storage {
                        anomalies.push(Anomaly {
                            pallet_id: row.pallet_id.clone(),
                            location_code: loc.code.clone(),
                            rule_id: rule.id.clone(),
                            rule_name: rule.name.clone(),
                            rule_type: rule.rule_type.to_string(),
                            priority: rule.priority,
                            category: rule.category,
                            precedence_level: rule.precedence_level,
                            details: json!({
                                "kind": "type_mismatch",
                                "decoded_as": "STORAGE",
                                "catalog_type": loc.location_type.to_string(),
                                "aisle": structured.aisle,
                            }),
                            correlated_anomaly_ids: Vec::new(),
                        });
                    }
                }
            }

            if check_patterns {
                if let Some(pattern) = &loc.pattern {
                    if !glob_match(pattern, &canonical(&loc.code)) {
                        anomalies.push(Anomaly {
                            pallet_id: row.pallet_id.clone(),
                            location_code: loc.code.clone(),
                            rule_id: rule.id.clone(),
                            rule_name: rule.name.clone(),
                            rule_type: rule.rule_type.to_string(),
                            priority: rule.priority,
                            category: rule.category,
                            precedence_level: rule.precedence_level,
                            details: json!({ "kind": "pattern_mismatch", "pattern": pattern }),
                            correlated_anomaly_ids: Vec::new(),
                        });
                    }
                }
            }
        }
        Ok(anomalies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogView;
    use crate::domains::inventory_row::InventoryRow;
    use crate::domains::location::Location;
    use crate::domains::rule::{Category, Priority, RuleType};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap as Map;
    use tokio_util::sync::CancellationToken;

    fn catalog() -> CatalogView {
        let loc = Location {
            code: "01-A-015-C".to_string(),
            warehouse_id: "T".to_string(),
            warehouse_config_id: None,
            location_type: LocationType::Receiving,
            capacity: 10,
            zone: "GENERAL".to_string(),
            pattern: None,
            allowed_products: vec![],
            special_requirements: Map::new(),
            structure: None,
            is_active: true,
        };
        CatalogView::new(vec![loc], Map::new())
    }

    #[test]
    fn flags_storage_shaped_code_typed_as_receiving() {
        let catalog = catalog();
        let rule = Rule {
            id: "R1".to_string(),
            name: "Mapping error".to_string(),
            rule_type: RuleType::LocationMappingError,
            category: Category::Space,
            priority: Priority::Medium,
            is_active: true,
            conditions: json!({"validate_location_types": true, "check_pattern_consistency": false}),
            precedence_level: 0,
        };
        let snapshot = Snapshot {
            rows: vec![InventoryRow {
                pallet_id: "P1".to_string(),
                location_code: "01-A-015-C".to_string(),
                description: "GENERAL".to_string(),
                receipt_number: "R1".to_string(),
                creation_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            }],
        };
        let cancel = CancellationToken::new();
        let ctx = EvalContext {
            tenant: "T",
            catalog: &catalog,
            warehouse_config: None,
            now: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            cancel: &cancel,
        };

        let anomalies = LocationMappingErrorEvaluator.evaluate(&rule, &snapshot, &ctx).unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].details["kind"], json!("type_mismatch"));
    }
}
