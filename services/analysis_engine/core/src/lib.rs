//! Analysis Engine Core
//!
//! The warehouse anomaly Rule Engine: rule loading, per-rule evaluators,
//! location normalization and resolution, and correlation / ordering of
//! results. Zero infrastructure dependencies — no `sqlx`, no `axum`. `infra`
//! provides the Postgres-backed repository implementations and wraps
//! `Engine` with the concurrency/timeout semantics; `api` wires the two
//! together behind a thin HTTP surface.
//!
//! ## Architecture
//!
//! - `domains/`: domain entities
//! - `normalize`: Code Normalizer
//! - `catalog`: Location Catalog
//! - `context_resolver`: Warehouse Context Resolver
//! - `rules/`: Rule Store ordering and condition-schema validation
//! - `evaluators/`: Evaluator Registry and the per-rule-kind evaluators
//! - `engine`: Engine Orchestrator
//! - `repositories/`: repository trait definitions (no implementations)
//! - `services/`: service trait definitions (no implementations)
//! - `clock`: injectable `now` source (`Clock`)
//! - `error`: engine error taxonomy

pub mod catalog;
pub mod clock;
pub mod context_resolver;
pub mod domains;
pub mod engine;
pub mod error;
pub mod evaluators;
pub mod normalize;
pub mod repositories;
pub mod rules;
pub mod services;

pub use domains::anomaly::Anomaly;
pub use domains::inventory_row::{InventoryRow, Snapshot};
pub use domains::report::Report;
pub use domains::rule::Rule;
pub use domains::user_context::UserContext;
pub use engine::{Engine, EvaluateInput};
pub use error::{EngineError, Result};
