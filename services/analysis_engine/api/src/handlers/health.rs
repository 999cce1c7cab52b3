use axum::response::IntoResponse;
use axum::{http::StatusCode, response::Response, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Serialize)]
pub struct HealthResp {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: String,
}

pub async fn health_check(axum::Extension(pool): axum::Extension<PgPool>) -> Response {
    let db_status = match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => "healthy".to_string(),
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            "unhealthy".to_string()
        },
    };

    let resp = HealthResp {
        status: if db_status == "healthy" { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        database: db_status.clone(),
    };

    if db_status == "healthy" {
        (StatusCode::OK, Json(resp)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(resp)).into_response()
    }
}
