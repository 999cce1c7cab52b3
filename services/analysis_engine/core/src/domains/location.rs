//! Location domain entity (`Location`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Location classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    Storage,
    Receiving,
    Staging,
    Dock,
    Transitional,
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocationType::Storage => "STORAGE",
            LocationType::Receiving => "RECEIVING",
            LocationType::Staging => "STAGING",
            LocationType::Dock => "DOCK",
            LocationType::Transitional => "TRANSITIONAL",
        };
        write!(f, "{s}")
    }
}

/// Decoded structural address for a STORAGE location (`structure`).
///
/// Invariant: when present on a `Location`, all four fields are consistent
/// with `code` under the normalizer's `AA-R-PPP-L` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStructure {
    pub aisle: u32,
    pub rack: String,
    pub position: u32,
    pub level: String,
}

/// A physical or template-bound virtual location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub code: String,
    pub warehouse_id: String,
    pub warehouse_config_id: Option<String>,
    pub location_type: LocationType,
    pub capacity: u32,
    pub zone: String,
    pub pattern: Option<String>,
    pub allowed_products: Vec<String>,
    pub special_requirements: BTreeMap<String, String>,
    pub structure: Option<StorageStructure>,
    pub is_active: bool,
}

impl Location {
    /// Empty `allowed_products` means any product is allowed (open question).
    pub fn allows_product(&self, description: &str) -> bool {
        if self.allowed_products.is_empty() {
            return true;
        }
        let upper = description.to_ascii_uppercase();
        self.allowed_products
            .iter()
            .any(|pattern| crate::normalize::glob_match(&pattern.to_ascii_uppercase(), &upper))
    }
}

impl crate::domains::BaseEntity for Location {
    fn tenant_id(&self) -> &str {
        &self.warehouse_id
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}
