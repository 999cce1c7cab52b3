//! Analysis engine service trait.
//!
//! This is the async boundary drawn between `core` (trait) and `infra`
//! (implementation). The concurrency semaphore and per-evaluation
//! timeout live in the `infra` implementation, not here: `core`'s
//! `Engine::evaluate` itself stays synchronous so evaluators never need an
//! executor.

use async_trait::async_trait;

use crate::domains::inventory_row::Snapshot;
use crate::domains::report::Report;
use crate::domains::user_context::UserContext;
use crate::error::Result;

/// Runs one full analysis for `user` over `snapshot`
/// (`evaluate(user, snapshot) -> Report`).
#[async_trait]
pub trait AnalysisEngineService: Send + Sync {
    async fn analyze(&self, user: &UserContext, snapshot: Snapshot) -> Result<Report>;
}
