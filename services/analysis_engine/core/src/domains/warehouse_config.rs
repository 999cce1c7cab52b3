//! Warehouse configuration (template-bound catalog version), `WarehouseConfig`.

use serde::{Deserialize, Serialize};

/// A special area carved out of the generated grid (e.g. a receiving dock
/// or staging lane) that isn't part of the aisle/rack/position/level grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialArea {
    pub code: String,
    pub location_type: crate::domains::location::LocationType,
    pub capacity: u32,
    pub zone: String,
}

/// Structural parameters used to generate/validate a tenant's storage grid
/// and to bound `INVALID_LOCATION`'s "impossible" check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub id: String,
    pub warehouse_id: String,
    pub user_id: String,

    pub aisles: u32,
    pub racks: u32,
    pub positions: u32,
    pub levels: u32,
    /// Level names in low-to-high order, e.g. `["A", "B", "C"]`.
    pub level_names: Vec<String>,

    pub default_capacity: u32,
    pub bidimensional: bool,
    pub special_areas: Vec<SpecialArea>,

    pub is_active: bool,
}

/// Maps a rack letter (`"A"`, `"B"`, ...) to its 1-based index, or 0 if it
/// isn't a single uppercase ASCII letter.
fn rack_index(rack: &str) -> u32 {
    match rack.chars().next() {
        Some(c) if rack.chars().count() == 1 && c.is_ascii_uppercase() => c as u32 - 'A' as u32 + 1,
        _ => 0,
    }
}

impl WarehouseConfig {
    /// Bounds check for a decoded `StorageStructure` ("impossible location").
    /// Returns the name of the first dimension found out of bounds, if any.
    pub fn out_of_bounds_dimension(
        &self,
        structure: &crate::domains::location::StorageStructure,
    ) -> Option<&'static str> {
        if structure.aisle == 0 || structure.aisle > self.aisles {
            return Some("aisle");
        }
        let rack = rack_index(&structure.rack);
        if rack == 0 || rack > self.racks {
            return Some("rack");
        }
        if structure.position == 0 || structure.position > self.positions {
            return Some("position");
        }
        if !self.level_names.iter().any(|l| l == &structure.level) {
            return Some("level");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::location::StorageStructure;

    fn config(aisles: u32, racks: u32, positions: u32, level_names: &[&str]) -> WarehouseConfig {
        WarehouseConfig {
            id: "WC1".to_string(),
            warehouse_id: "W1".to_string(),
            user_id: "U1".to_string(),
            aisles,
            racks,
            positions,
            levels: level_names.len() as u32,
            level_names: level_names.iter().map(|s| s.to_string()).collect(),
            default_capacity: 1,
            bidimensional: false,
            special_areas: Vec::new(),
            is_active: true,
        }
    }

    fn structure(aisle: u32, rack: &str, position: u32, level: &str) -> StorageStructure {
        StorageStructure {
            aisle,
            rack: rack.to_string(),
            position,
            level: level.to_string(),
        }
    }

    #[test]
    fn rack_out_of_bounds_is_flagged() {
        let cfg = config(5, 2, 10, &["A", "B"]);
        let s = structure(1, "C", 1, "A");
        assert_eq!(cfg.out_of_bounds_dimension(&s), Some("rack"));
    }

    #[test]
    fn rack_within_bounds_passes() {
        let cfg = config(5, 2, 10, &["A", "B"]);
        let s = structure(1, "B", 1, "A");
        assert_eq!(cfg.out_of_bounds_dimension(&s), None);
    }
}
