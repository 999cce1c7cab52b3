//! `POST /api/v1/analyze` (representative HTTP shape only — authn, routing
//! conventions, and pagination are explicitly out of scope here).

use axum::{extract::Extension, Json};
use serde::Deserialize;

use analysis_engine_core::domains::inventory_row::{InventoryRow, Snapshot};
use analysis_engine_core::domains::report::Report;
use analysis_engine_core::domains::user_context::UserContext;
use shared_error::AppError;

use crate::state::AppState;

/// Wire shape for one uploaded row (`Snapshot`). Field mapping from
/// the source spreadsheet format happens upstream of this boundary.
#[derive(Debug, Deserialize)]
pub struct InventoryRowReq {
    pub pallet_id: String,
    pub location_code: String,
    pub description: String,
    pub receipt_number: String,
    pub creation_date: chrono::DateTime<chrono::Utc>,
}

impl From<InventoryRowReq> for InventoryRow {
    fn from(r: InventoryRowReq) -> Self {
        InventoryRow {
            pallet_id: r.pallet_id,
            location_code: r.location_code,
            description: r.description,
            receipt_number: r.receipt_number,
            creation_date: r.creation_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub user: UserContext,
    pub rows: Vec<InventoryRowReq>,
}

pub async fn analyze(
    Extension(state): Extension<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Report>, AppError> {
    let snapshot = Snapshot { rows: request.rows.into_iter().map(InventoryRow::from).collect() };

    let report = state
        .engine_service
        .analyze(&request.user, snapshot)
        .await
        .map_err(analysis_engine_infra::to_app_error)?;

    Ok(Json(report))
}
