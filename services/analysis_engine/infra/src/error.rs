//! Boundary conversion from `EngineError` to `shared_error::AppError`.
//!
//! `core` never depends on `shared_error` (it would pull in `sqlx`/`axum`),
//! so this conversion lives here rather than as a `From` impl — both types
//! are foreign to this crate, which the orphan rule would reject anyway.

use analysis_engine_core::error::EngineError;
use shared_error::AppError;

pub fn to_app_error(err: EngineError) -> AppError {
    match err {
        EngineError::InputMalformed(msg) => AppError::ValidationError(msg),
        EngineError::RuleMalformed(msg) => {
            tracing::warn!("rule malformed: {msg}");
            AppError::ValidationError(msg)
        },
        EngineError::EvaluatorRuntime { rule_id, message } => {
            AppError::InternalError(format!("rule {rule_id} errored: {message}"))
        },
        EngineError::EvaluatorTimeout { rule_id, budget_ms } => {
            AppError::InternalError(format!("rule {rule_id} timed out after {budget_ms}ms"))
        },
        EngineError::CatalogUnavailable(msg) => {
            tracing::error!("catalog unavailable: {msg}");
            AppError::ServiceUnavailable(format!("catalog unavailable: {msg}"))
        },
        EngineError::RuleStoreUnavailable(msg) => {
            tracing::error!("rule store unavailable: {msg}");
            AppError::ServiceUnavailable(format!("rule store unavailable: {msg}"))
        },
        EngineError::ContextAmbiguous => {
            tracing::warn!("context ambiguous for snapshot");
            AppError::ContextNotFound("context ambiguous for snapshot".to_string())
        },
        EngineError::ContextNotFound => AppError::ContextNotFound("context not found for snapshot".to_string()),
        EngineError::Cancelled => AppError::Unprocessable("evaluation cancelled".to_string()),
        EngineError::SnapshotTooLarge { rows, limit } => {
            AppError::ValidationError(format!("snapshot has {rows} rows, limit is {limit}"))
        },
    }
}
