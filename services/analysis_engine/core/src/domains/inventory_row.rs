//! Transient snapshot row (`InventoryRow`, `Snapshot`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One pallet record from an uploaded inventory snapshot. Column mapping
/// from the source spreadsheet format happens externally; the engine only
/// ever sees these five canonical fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRow {
    pub pallet_id: String,
    pub location_code: String,
    pub description: String,
    pub receipt_number: String,
    pub creation_date: DateTime<Utc>,
}

/// Ordered rows for one analysis. Column-mapping from source format is
/// performed externally; rows with missing `pallet_id`/`location_code` are
/// retained and flagged by `DATA_INTEGRITY` rather than dropped.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Snapshot {
    pub rows: Vec<InventoryRow>,
}

impl InventoryRow {
    pub fn has_missing_identifier(&self) -> bool {
        self.pallet_id.trim().is_empty()
    }

    pub fn has_corrupt_identifier(&self) -> bool {
        self.has_missing_identifier() || self.pallet_id.chars().any(|c| c.is_control())
    }
}
