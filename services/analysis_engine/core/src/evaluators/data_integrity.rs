//! DATA_INTEGRITY evaluator.
//!
//! Covers duplicate scans and corrupt identifiers; "impossible" structured
//! codes are owned by INVALID_LOCATION.

use super::{EvalContext, Evaluator};
use crate::domains::anomaly::Anomaly;
use crate::domains::inventory_row::Snapshot;
use crate::domains::rule::Rule;
use crate::error::Result;
use crate::normalize::canonical;
use serde_json::json;
use std::collections::BTreeMap;

pub struct DataIntegrityEvaluator;

impl Evaluator for DataIntegrityEvaluator {
    fn evaluate(&self, rule: &Rule, snapshot: &Snapshot, ctx: &EvalContext<'_>) -> Result<Vec<Anomaly>> {
        let check_duplicates = rule.condition_bool("check_duplicate_scans").unwrap_or(false);

        let mut anomalies = Vec::new();

        for (idx, row) in snapshot.rows.iter().enumerate() {
            if ctx.cancelled_at(idx) {
                return Err(crate::error::EngineError::Cancelled);
            }
            if row.has_corrupt_identifier() {
                anomalies.push(Anomaly {
                    pallet_id: row.pallet_id.clone(),
                    location_code: canonical(&row.location_code),
                    rule_id: rule.id.clone(),
                    rule_name: rule.name.clone(),
                    rule_type: rule.rule_type.to_string(),
                    priority: rule.priority,
                    category: rule.category,
                    precedence_level: rule.precedence_level,
                    details: json!({ "kind": "corrupt_identifier" }),
                    correlated_anomaly_ids: Vec::new(),
                });
            }
        }

        if check_duplicates {
            let mut by_pallet: BTreeMap<&str, Vec<String>> = BTreeMap::new();
            for (idx, row) in snapshot.rows.iter().enumerate() {
                if ctx.cancelled_at(idx) {
                    return Err(crate::error::EngineError::Cancelled);
                }
                if row.has_missing_identifier() {
                    continue;
                }
                let Some(loc) = ctx.catalog.resolve(ctx.tenant, &row.location_code) else {
                    continue;
                };
                by_pallet.entry(row.pallet_id.as_str()).or_default().push(loc.code.clone());
            }

            for (pallet_id, mut codes) in by_pallet {
                codes.sort();
                codes.dedup();
                if codes.len() < 2 {
                    continue;
                }
                // One anomaly per occurrence beyond the first distinct location.
                for extra in codes.iter().skip(1) {
                    anomalies.push(Anomaly {
                        pallet_id: pallet_id.to_string(),
                        location_code: extra.clone(),
                        rule_id: rule.id.clone(),
                        rule_name: rule.name.clone(),
                        rule_type: rule.rule_type.to_string(),
                        priority: rule.priority,
                        category: rule.category,
                        precedence_level: rule.precedence_level,
                        details: json!({ "kind": "duplicate_scan", "locations": codes }),
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
    use crate::domains::inventory_row::InventoryRow;
    use crate::domains::location::{Location, LocationType};
    use crate::domains::rule::{Category, Priority, RuleType};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap as Map;
    use tokio_util::sync::CancellationToken;

    fn catalog() -> CatalogView {
        let mk = |code: &str| Location {
            code: code.to_string(),
            warehouse_id: "T".to_string(),
            warehouse_config_id: None,
            location_type: LocationType::Storage,
            capacity: 10,
            zone: "GENERAL".to_string(),
            pattern: None,
            allowed_products: vec![],
            special_requirements: Map::new(),
            structure: None,
            is_active: true,
        };
        CatalogView::new(vec![mk("A-01-001-A"), mk("A-01-002-A")], Map::new())
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
    fn flags_pallet_in_two_locations() {
        let catalog = catalog();
        let rule = Rule {
            id: "R1".to_string(),
            name: "Data integrity".to_string(),
            rule_type: RuleType::DataIntegrity,
            category: Category::Product,
            priority: Priority::Medium,
            is_active: true,
            conditions: json!({"check_duplicate_scans": true}),
            precedence_level: 0,
        };
        let snapshot = Snapshot {
            rows: vec![row("P1", "A-01-001-A"), row("P1", "A-01-002-A")],
        };
        let cancel = CancellationToken::new();
        let ctx = EvalContext {
            tenant: "T",
            catalog: &catalog,
            warehouse_config: None,
            now: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            cancel: &cancel,
        };

        let anomalies = DataIntegrityEvaluator.evaluate(&rule, &snapshot, &ctx).unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].details["kind"], json!("duplicate_scan"));
    }

    #[test]
    fn flags_corrupt_identifier() {
        let catalog = catalog();
        let rule = Rule {
            id: "R1".to_string(),
            name: "Data integrity".to_string(),
            rule_type: RuleType::DataIntegrity,
            category: Category::Product,
            priority: Priority::Medium,
            is_active: true,
            conditions: json!({"check_duplicate_scans": false}),
            precedence_level: 0,
        };
        let snapshot = Snapshot {
            rows: vec![row("", "A-01-001-A")],
        };
        let cancel = CancellationToken::new();
        let ctx = EvalContext {
            tenant: "T",
            catalog: &catalog,
            warehouse_config: None,
            now: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            cancel: &cancel,
        };

        let anomalies = DataIntegrityEvaluator.evaluate(&rule, &snapshot, &ctx).unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].details["kind"], json!("corrupt_identifier"));
    }
}
