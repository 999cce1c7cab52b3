//! Rule domain entity (`Rule`, "Rule condition schema").

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminates which evaluator a rule is resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    StagnantPallets,
    UncoordinatedLots,
    Overcapacity,
    InvalidLocation,
    DataIntegrity,
    LocationSpecificStagnant,
    TemperatureZoneMismatch,
    LocationMappingError,
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleType::StagnantPallets => "STAGNANT_PALLETS",
            RuleType::UncoordinatedLots => "UNCOORDINATED_LOTS",
            RuleType::Overcapacity => "OVERCAPACITY",
            RuleType::InvalidLocation => "INVALID_LOCATION",
            RuleType::DataIntegrity => "DATA_INTEGRITY",
            RuleType::LocationSpecificStagnant => "LOCATION_SPECIFIC_STAGNANT",
            RuleType::TemperatureZoneMismatch => "TEMPERATURE_ZONE_MISMATCH",
            RuleType::LocationMappingError => "LOCATION_MAPPING_ERROR",
        };
        write!(f, "{s}")
    }
}

/// Rule category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    FlowTime,
    Space,
    Product,
}

/// Sort key ordering breaks ties by category using this enum order.
impl Category {
    pub fn enum_order(self) -> u8 {
        match self {
            Category::FlowTime => 0,
            Category::Space => 1,
            Category::Product => 2,
        }
    }
}

/// Rule priority; `rank()` is used for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Priority {
    /// VERY_HIGH=4, HIGH=3, MEDIUM=2, LOW=1.
    pub fn rank(self) -> u8 {
        match self {
            Priority::VeryHigh => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// A configured rule. `conditions` is a free-form JSON object; each
/// `rule_type`'s evaluator pulls out the structured keys it defines (e.g.
/// `time_threshold_hours`) via the `condition_*` accessors below.
/// `rules::schema::validate` checks the required keys are present before a
/// rule is accepted into the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub rule_type: RuleType,
    pub category: Category,
    pub priority: Priority,
    pub is_active: bool,
    pub conditions: serde_json::Value,
    pub precedence_level: i32,
}

impl Rule {
    /// `(precedence_level asc, priority rank desc, id asc)` — the active
    /// rule store ordering.
    pub fn store_order_key(&self) -> (i32, std::cmp::Reverse<u8>, String) {
        (self.precedence_level, std::cmp::Reverse(self.priority.rank()), self.id.clone())
    }

    /// Fetch a structured condition key directly, e.g. `time_threshold_hours`.
    pub fn condition_f64(&self, key: &str) -> Option<f64> {
        self.conditions.get(key).and_then(|v| v.as_f64())
    }

    pub fn condition_bool(&self, key: &str) -> Option<bool> {
        self.conditions.get(key).and_then(|v| v.as_bool())
    }

    pub fn condition_str(&self, key: &str) -> Option<&str> {
        self.conditions.get(key).and_then(|v| v.as_str())
    }

    pub fn condition_str_list(&self, key: &str) -> Vec<String> {
        self.conditions
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    }
}
