//! Service trait definitions, no implementations: the Orchestrator passes
//! an immutable `CatalogView` and `RuleSnapshot` into evaluators.

pub mod engine;

pub use engine::AnalysisEngineService;
