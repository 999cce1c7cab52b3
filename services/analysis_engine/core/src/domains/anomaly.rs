//! Anomaly domain entity (`Anomaly`).

use crate::domains::rule::{Category, Priority};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A single finding produced by one evaluator against one row or row-group.
/// `details` is kind-specific: each evaluator documents which keys it
/// populates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub pallet_id: String,
    pub location_code: String,
    pub rule_id: String,
    pub rule_name: String,
    pub rule_type: String,
    pub priority: Priority,
    pub category: Category,
    pub precedence_level: i32,
    pub details: Json,
    pub correlated_anomaly_ids: Vec<String>,
}

impl Anomaly {
    /// `(rule_id, pallet_id, location_code)` — the deduplication key.
    pub fn dedup_key(&self) -> (String, String, String) {
        (self.rule_id.clone(), self.pallet_id.clone(), self.location_code.clone())
    }

    /// `(priority rank desc, precedence_level asc, category enum order,
    /// rule_id asc, pallet_id asc)` — the output ordering.
    pub fn sort_key(&self) -> (std::cmp::Reverse<u8>, i32, u8, String, String) {
        (
            std::cmp::Reverse(self.priority.rank()),
            self.precedence_level,
            self.category.enum_order(),
            self.rule_id.clone(),
            self.pallet_id.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn anomaly(rule_id: &str, pallet_id: &str, priority: Priority, precedence_level: i32) -> Anomaly {
        Anomaly {
            pallet_id: pallet_id.to_string(),
            location_code: "RECV-01".to_string(),
            rule_id: rule_id.to_string(),
            rule_name: rule_id.to_string(),
            rule_type: "STAGNANT_PALLETS".to_string(),
            priority,
            category: Category::FlowTime,
            precedence_level,
            details: serde_json::json!({}),
            correlated_anomaly_ids: vec![],
        }
    }

    proptest! {
        /// Sorting by `sort_key()` is deterministic regardless of the input
        /// order the anomalies arrived in — any shuffle of the same set
        /// produces the same sorted sequence.
        #[test]
        fn sort_key_ordering_is_independent_of_input_order(
            seeds in prop::collection::vec(
                (0u8..3, -2i32..3, 0usize..4, 0usize..4),
                1..12,
            ),
            shuffle_seed in 0u64..10_000,
        ) {
            let priorities = [Priority::Low, Priority::Medium, Priority::High];
            let rule_ids = ["R0", "R1", "R2", "R3"];
            let pallet_ids = ["P0", "P1", "P2", "P3"];

            let original: Vec<Anomaly> = seeds
                .iter()
                .map(|(p, lvl, r, pl)| anomaly(rule_ids[*r], pallet_ids[*pl], priorities[*p as usize], *lvl))
                .collect();

            let mut shuffled = original.clone();
            // Deterministic pseudo-shuffle (no RNG crate/thread-rng dependency
            // needed for a property that only cares about order-independence).
            let mut seed = shuffle_seed;
            for i in (1..shuffled.len()).rev() {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                let j = (seed as usize) % (i + 1);
                shuffled.swap(i, j);
            }

            let mut sorted_original = original;
            sorted_original.sort_by_key(|a| a.sort_key());
            let mut sorted_shuffled = shuffled;
            sorted_shuffled.sort_by_key(|a| a.sort_key());

            let keys_original: Vec<_> = sorted_original.iter().map(|a| a.sort_key()).collect();
            let keys_shuffled: Vec<_> = sorted_shuffled.iter().map(|a| a.sort_key()).collect();
            prop_assert_eq!(keys_original, keys_shuffled);
        }
    }
}
