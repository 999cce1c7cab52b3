//! Per-`rule_type` condition schema validation — backs the `RuleMalformed`
//! error kind.
//!
//! Rule conditions are validated when a rule is stored/activated, not on
//! every evaluation; a rule that fails validation is marked inactive by
//! the store and excluded from `active_rules_in_order`.

use crate::domains::rule::RuleType;
use serde_json::Value as Json;

/// Validate `conditions` against the schema for `rule_type`. Returns a
/// human-readable reason on failure (surfaced in `Report::warnings`).
pub fn validate(rule_type: RuleType, conditions: &Json) -> Result<(), String> {
    let require_array = |key: &str| -> Result<(), String> {
        match conditions.get(key) {
            Some(Json::Array(arr)) if !arr.is_empty() => Ok(()),
            Some(_) => Err(format!("`{key}` must be a non-empty array")),
            None => Err(format!("missing required field `{key}`")),
        }
    };
    let require_number = |key: &str| -> Result<(), String> {
        match conditions.get(key).and_then(Json::as_f64) {
            Some(_) => Ok(()),
            None => Err(format!("missing or non-numeric required field `{key}`")),
        }
    };
    let require_bool = |key: &str| -> Result<(), String> {
        match conditions.get(key).and_then(Json::as_bool) {
            Some(_) => Ok(()),
            None => Err(format!("missing or non-boolean required field `{key}`")),
        }
    };
    let require_string = |key: &str| -> Result<(), String> {
        match conditions.get(key).and_then(Json::as_str) {
            Some(_) => Ok(()),
            None => Err(format!("missing or non-string required field `{key}`")),
        }
    };

    match rule_type {
        RuleType::StagnantPallets => {
            require_array("location_types")?;
            require_number("time_threshold_hours")?;
            Ok(())
        },
        RuleType::UncoordinatedLots => {
            require_array("location_types")?;
            let theta = conditions
                .get("completion_threshold")
                .and_then(Json::as_f64)
                .ok_or_else(|| "missing or non-numeric `completion_threshold`".to_string())?;
            if !(0.0 < theta && theta <= 1.0) {
                return Err("`completion_threshold` must be in (0, 1]".to_string());
            }
            Ok(())
        },
        RuleType::Overcapacity => {
            let has_check_all = conditions.get("check_all_locations").and_then(Json::as_bool).unwrap_or(false);
            let has_filter = conditions.get("location_types").is_some() || conditions.get("zones").is_some();
            if has_check_all || has_filter {
                Ok(())
            } else {
                Err("must set `check_all_locations` or a `location_types`/`zones` filter".to_string())
            }
        },
        RuleType::InvalidLocation => require_bool("check_undefined_locations"),
        RuleType::DataIntegrity => require_bool("check_duplicate_scans"),
        RuleType::LocationSpecificStagnant => {
            require_string("location_pattern")?;
            require_number("time_threshold_hours")?;
            Ok(())
        },
        RuleType::TemperatureZoneMismatch => {
            require_array("product_patterns")?;
            require_array("prohibited_zones")?;
            Ok(())
        },
        RuleType::LocationMappingError => {
            require_bool("validate_location_types")?;
            require_bool("check_pattern_consistency")?;
            Ok(())
        },
    }
}
