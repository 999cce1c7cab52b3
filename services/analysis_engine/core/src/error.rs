use thiserror::Error;

/// Error taxonomy for the rule engine.
///
/// `core` never depends on `sqlx`/`axum` — `infra` and `api` translate these
/// into `shared_error::AppError` at the boundary, keeping `sqlx` out of
/// `core` entirely.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input malformed: {0}")]
    InputMalformed(String),

    #[error("rule malformed: {0}")]
    RuleMalformed(String),

    #[error("evaluator runtime error in rule {rule_id}: {message}")]
    EvaluatorRuntime { rule_id: String, message: String },

    #[error("evaluator timeout in rule {rule_id} after {budget_ms}ms")]
    EvaluatorTimeout { rule_id: String, budget_ms: u64 },

    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("rule store unavailable: {0}")]
    RuleStoreUnavailable(String),

    #[error("context ambiguous for snapshot")]
    ContextAmbiguous,

    #[error("context not found for snapshot")]
    ContextNotFound,

    #[error("evaluation cancelled")]
    Cancelled,

    #[error("snapshot exceeds row limit: {rows} > {limit}")]
    SnapshotTooLarge { rows: usize, limit: usize },
}

/// Machine-readable discriminant stored in `Report::per_rule_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Runtime,
    Timeout,
}

impl EngineError {
    /// True for the fatal kinds that abort the whole evaluation:
    /// `CatalogUnavailable` / `RuleStoreUnavailable`.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::CatalogUnavailable(_) | EngineError::RuleStoreUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
