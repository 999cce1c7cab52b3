//! UNCOORDINATED_LOTS evaluator.

use super::{EvalContext, Evaluator};
use crate::domains::anomaly::Anomaly;
use crate::domains::inventory_row::{InventoryRow, Snapshot};
use crate::domains::location::LocationType;
use crate::domains::rule::Rule;
use crate::error::Result;
use serde_json::json;
use std::collections::BTreeMap;

pub struct UncoordinatedLotsEvaluator;

impl Evaluator for UncoordinatedLotsEvaluator {
    fn evaluate(&self, rule: &Rule, snapshot: &Snapshot, ctx: &EvalContext<'_>) -> Result<Vec<Anomaly>> {
        let theta = rule.condition_f64("completion_threshold").unwrap_or(1.0);
        let source_types: Vec<LocationType> = rule
            .condition_str_list("location_types")
            .iter()
            .filter_map(|s| serde_json::from_value(json!(s)).ok())
            .collect();

        // Group resolved rows by receipt_number, classifying each as "source" or "moved".
        let mut by_receipt: BTreeMap<&str, (Vec<&InventoryRow>, usize, usize)> = BTreeMap::new();

        for (idx, row) in snapshot.rows.iter().enumerate() {
            if ctx.cancelled_at(idx) {
                return Err(crate::error::EngineError::Cancelled);
            }
            let Some(loc) = ctx.catalog.resolve(ctx.tenant, &row.location_code) else {
                continue;
            };
            let entry = by_receipt.entry(row.receipt_number.as_str()).or_insert_with(|| (Vec::new(), 0, 0));
            if source_types.contains(&loc.location_type) {
                entry.0.push(row);
                entry.1 += 1;
            } else {
                entry.2 += 1;
            }
        }

        let mut anomalies = Vec::new();
        for (_receipt, (source_rows, src, moved)) in by_receipt {
            let total = src + moved;
            if total == 0 {
                continue;
            }
            let completion = moved as f64 / total as f64;
            let straggler_ceiling = ((1.0 - theta) * total as f64).ceil() as usize;
            if completion >= theta && src > 0 && src <= straggler_ceiling {
                for row in source_rows {
                    let loc = ctx
                        .catalog
                        .resolve(ctx.tenant, &row.location_code)
                        .expect("row was classified as source via a successful resolve");
                    anomalies.push(Anomaly {
                        pallet_id: row.pallet_id.clone(),
                        location_code: loc.code.clone(),
                        rule_id: rule.id.clone(),
                        rule_name: rule.name.clone(),
                        rule_type: rule.rule_type.to_string(),
                        priority: rule.priority,
                        category: rule.category,
                        precedence_level: rule.precedence_level,
                        details: json!({ "completion": completion, "straggler_count": src }),
                        correlated_anomaly_ids: Vec::new(),
                    });
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
    use crate::domains::location::Location;
    use crate::domains::rule::{Category, Priority, RuleType};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap as Map;
    use tokio_util::sync::CancellationToken;

    fn catalog() -> CatalogView {
        let recv = Location {
            code: "RECV-01".to_string(),
            warehouse_id: "T".to_string(),
            warehouse_config_id: None,
            location_type: LocationType::Receiving,
            capacity: 100,
            zone: "GENERAL".to_string(),
            pattern: None,
            allowed_products: vec![],
            special_requirements: Map::new(),
            structure: None,
            is_active: true,
        };
        let storage = Location {
            code: "A-01-001-A".to_string(),
            warehouse_id: "T".to_string(),
            warehouse_config_id: None,
            location_type: LocationType::Storage,
            capacity: 100,
            zone: "GENERAL".to_string(),
            pattern: None,
            allowed_products: vec![],
            special_requirements: Map::new(),
            structure: None,
            is_active: true,
        };
        CatalogView::new(vec![recv, storage], Map::new())
    }

    fn row(pallet: &str, code: &str) -> InventoryRow {
        InventoryRow {
            pallet_id: pallet.to_string(),
            location_code: code.to_string(),
            description: "GENERAL".to_string(),
            receipt_number: "R1".to_string(),
            creation_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn scenario_s3_lot_stragglers() {
        let catalog = catalog();
        let rule = Rule {
            id: "R1".to_string(),
            name: "Stragglers".to_string(),
            rule_type: RuleType::UncoordinatedLots,
            category: Category::FlowTime,
            priority: Priority::High,
            is_active: true,
            conditions: json!({"completion_threshold": 0.8, "location_types": ["RECEIVING"]}),
            precedence_level: 0,
        };
        let mut rows: Vec<InventoryRow> = (0..8).map(|i| row(&format!("M{i}"), "A-01-001-A")).collect();
        rows.extend((0..2).map(|i| row(&format!("S{i}"), "RECV-01")));
        let snapshot = Snapshot { rows };
        let cancel = CancellationToken::new();
        let ctx = EvalContext {
            tenant: "T",
            catalog: &catalog,
            warehouse_config: None,
            now: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            cancel: &cancel,
        };

        let anomalies = UncoordinatedLotsEvaluator.evaluate(&rule, &snapshot, &ctx).unwrap();
        assert_eq!(anomalies.len(), 2);
        assert!(anomalies.iter().all(|a| a.location_code == "RECV-01"));
        assert_eq!(anomalies[0].details["straggler_count"], json!(2));
    }

    #[test]
    fn no_anomaly_when_migration_not_started() {
        let catalog = catalog();
        let rule = Rule {
            id: "R1".to_string(),
            name: "Stragglers".to_string(),
            rule_type: RuleType::UncoordinatedLots,
            category: Category::FlowTime,
            priority: Priority::High,
            is_active: true,
            conditions: json!({"completion_threshold": 0.8, "location_types": ["RECEIVING"]}),
            precedence_level: 0,
        };
        let rows: Vec<InventoryRow> = (0..10).map(|i| row(&format!("S{i}"), "RECV-01")).collect();
        let snapshot = Snapshot { rows };
        let cancel = CancellationToken::new();
        let ctx = EvalContext {
            tenant: "T",
            catalog: &catalog,
            warehouse_config: None,
            now: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            cancel: &cancel,
        };

        let anomalies = UncoordinatedLotsEvaluator.evaluate(&rule, &snapshot, &ctx).unwrap();
        assert!(anomalies.is_empty());
    }
}
