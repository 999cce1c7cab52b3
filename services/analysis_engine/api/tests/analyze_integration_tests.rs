//! `/api/v1/analyze` exercised against a fake `AnalysisEngineService` — no
//! database required, router-level only.

use std::sync::Arc;

use analysis_engine_api::{routes, state::AppState};
use analysis_engine_core::domains::inventory_row::Snapshot;
use analysis_engine_core::domains::report::{Report, TenantResolution};
use analysis_engine_core::domains::user_context::UserContext;
use analysis_engine_core::error::Result;
use analysis_engine_core::services::engine::AnalysisEngineService;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

struct FakeEngineService;

#[async_trait]
impl AnalysisEngineService for FakeEngineService {
    async fn analyze(&self, _user: &UserContext, _snapshot: Snapshot) -> Result<Report> {
        Ok(Report {
            tenant: TenantResolution::Tenant("T1".to_string()),
            anomalies: vec![],
            rules_used: vec![],
            per_rule_stats: Default::default(),
            warnings: vec![],
        })
    }
}

fn test_app() -> axum::Router {
    let state = AppState { engine_service: Arc::new(FakeEngineService) };
    routes(state)
}

#[tokio::test]
async fn analyze_returns_report_for_well_formed_request() {
    let app = test_app();

    let body = serde_json::json!({
        "user": {
            "user_id": "u1",
            "accessible_tenants": ["T1"],
            "default_tenant": "T1"
        },
        "rows": [
            {
                "pallet_id": "P1",
                "location_code": "RECV-01",
                "description": "GENERAL",
                "receipt_number": "R1",
                "creation_date": "2025-01-01T02:00:00Z"
            }
        ]
    });

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/analyze")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let report: Report = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(report.tenant, TenantResolution::Tenant("T1".to_string()));
}

#[tokio::test]
async fn analyze_rejects_malformed_json_body() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/analyze")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
