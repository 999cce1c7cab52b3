//! Route definitions and router creation.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::Extension, routing::{get, post}, Router};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use analysis_engine_core::clock::SystemClock;
use analysis_engine_core::context_resolver::ResolverPolicy;
use analysis_engine_infra::repositories::location::PgLocationRepository;
use analysis_engine_infra::repositories::rule::PgRuleRepository;
use analysis_engine_infra::repositories::warehouse_config::PgWarehouseConfigRepository;
use analysis_engine_infra::services::engine::{AnalysisEngineServiceImpl, ResourceLimits};
use shared_config::Config;

use crate::handlers::{analyze, health};
use crate::state::AppState;

/// Create the complete application router (resource knobs wired from
/// `shared_config::Config`; the HTTP/JSON surface is a thin, representative
/// boundary only).
pub fn create_router(pool: PgPool, config: &Config) -> Router {
    let location_repo = Arc::new(PgLocationRepository::new(pool.clone()));
    let rule_repo = Arc::new(PgRuleRepository::new(pool.clone()));
    let warehouse_config_repo = Arc::new(PgWarehouseConfigRepository::new(pool.clone()));
    let clock = Arc::new(SystemClock);

    let limits = ResourceLimits {
        concurrency: config.engine_concurrency,
        evaluation_timeout: Duration::from_millis(config.evaluation_timeout_ms),
        rule_timeout: Duration::from_millis(config.rule_timeout_ms),
        max_snapshot_rows: config.max_snapshot_rows,
        resolver_policy: ResolverPolicy {
            min_ratio: config.resolver_min_ratio,
            min_matches: config.resolver_min_matches,
        },
    };

    let engine_service = Arc::new(AnalysisEngineServiceImpl::new(
        location_repo,
        warehouse_config_repo,
        rule_repo,
        clock,
        limits,
    ));

    let state = AppState { engine_service };

    routes(state).layer(Extension(pool))
}

/// The route table over an already-built `AppState`, independent of
/// Postgres wiring — lets tests exercise `/api/v1/analyze` against a fake
/// `AnalysisEngineService` without a database.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/analyze", post(analyze::analyze))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
