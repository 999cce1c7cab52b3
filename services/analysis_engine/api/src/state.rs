//! Application state for the analysis engine API.
//!
//! Thin on purpose (authn, routing, and pagination live outside the core):
//! this is just the one service trait `analyze` handlers call into.

use std::sync::Arc;

use analysis_engine_core::services::engine::AnalysisEngineService;

#[derive(Clone)]
pub struct AppState {
    pub engine_service: Arc<dyn AnalysisEngineService>,
}
