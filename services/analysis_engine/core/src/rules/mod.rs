//! Rule Store ordering and condition-schema validation.

pub mod schema;

use crate::domains::rule::Rule;

/// `(precedence_level asc, priority rank desc, id asc)`. Only
/// `is_active` rules participate — malformed rules are excluded by the
/// store at activation time as `RuleMalformed`.
pub fn active_rules_in_order(rules: &[Rule]) -> Vec<&Rule> {
    let mut active: Vec<&Rule> = rules.iter().filter(|r| r.is_active).collect();
    active.sort_by_key(|r| r.store_order_key());
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::rule::{Category, Priority, RuleType};
    use serde_json::json;

    fn rule(id: &str, precedence: i32, priority: Priority) -> Rule {
        Rule {
            id: id.to_string(),
            name: id.to_string(),
            rule_type: RuleType::StagnantPallets,
            category: Category::FlowTime,
            priority,
            is_active: true,
            conditions: json!({}),
            precedence_level: precedence,
        }
    }

    #[test]
    fn orders_by_precedence_then_priority_then_id() {
        let rules = vec![
            rule("b", 1, Priority::Low),
            rule("a", 1, Priority::VeryHigh),
            rule("c", 0, Priority::Low),
        ];
        let ordered = active_rules_in_order(&rules);
        let ids: Vec<&str> = ordered.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn excludes_inactive_rules() {
        let mut inactive = rule("x", 0, Priority::High);
        inactive.is_active = false;
        let rules = vec![rule("y", 0, Priority::High), inactive];
        let ordered = active_rules_in_order(&rules);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].id, "y");
    }
}
