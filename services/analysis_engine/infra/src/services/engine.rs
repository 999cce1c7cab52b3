//! `AnalysisEngineService` implementation (concurrency/resource model).
//! Wraps the pure, synchronous `core::Engine` with everything that
//! touches I/O or wall-clock time: catalog assembly across a user's
//! accessible tenants, per-evaluation concurrency limiting, the
//! per-evaluation timeout `T_total`, and cancellation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use analysis_engine_core::catalog::CatalogView;
use analysis_engine_core::clock::Clock;
use analysis_engine_core::context_resolver::{self, ResolverPolicy};
use analysis_engine_core::domains::inventory_row::Snapshot;
use analysis_engine_core::domains::report::{Report, TenantResolution};
use analysis_engine_core::domains::user_context::UserContext;
use analysis_engine_core::engine::{Engine, EvaluateInput};
use analysis_engine_core::error::{EngineError, Result};
use analysis_engine_core::repositories::location::LocationRepository;
use analysis_engine_core::repositories::rule::RuleRepository;
use analysis_engine_core::repositories::warehouse_config::WarehouseConfigRepository;
use analysis_engine_core::services::engine::AnalysisEngineService;
use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Resource knobs carried in from `shared_config::Config`.
#[derive(Debug, Clone, Copy)]
pub struct ResourceLimits {
    pub concurrency: usize,
    pub evaluation_timeout: Duration,
    pub rule_timeout: Duration,
    pub max_snapshot_rows: usize,
    pub resolver_policy: ResolverPolicy,
}

pub struct AnalysisEngineServiceImpl {
    location_repo: Arc<dyn LocationRepository>,
    warehouse_config_repo: Arc<dyn WarehouseConfigRepository>,
    rule_repo: Arc<dyn RuleRepository>,
    clock: Arc<dyn Clock>,
    semaphore: Arc<Semaphore>,
    limits: ResourceLimits,
    engine: Arc<Engine>,
}

impl AnalysisEngineServiceImpl {
    pub fn new(
        location_repo: Arc<dyn LocationRepository>,
        warehouse_config_repo: Arc<dyn WarehouseConfigRepository>,
        rule_repo: Arc<dyn RuleRepository>,
        clock: Arc<dyn Clock>,
        limits: ResourceLimits,
    ) -> Self {
        Self {
            location_repo,
            warehouse_config_repo,
            rule_repo,
            clock,
            semaphore: Arc::new(Semaphore::new(limits.concurrency)),
            limits,
            engine: Arc::new(Engine::default()),
        }
    }

    /// Builds a `CatalogView` spanning every tenant the caller can see — the
    /// context resolver scores across all of them in one pass, but
    /// per-tenant visibility is still enforced by `CatalogView` itself.
    async fn build_catalog(&self, user: &UserContext) -> Result<CatalogView> {
        let mut locations = Vec::new();
        let mut active_config_by_tenant = BTreeMap::new();
        for tenant in &user.accessible_tenants {
            let tenant_locations = self.location_repo.list_for_tenant(tenant).await?;
            locations.extend(tenant_locations);
            let active_config = self.location_repo.active_config_id(tenant).await?;
            active_config_by_tenant.insert(tenant.clone(), active_config);
        }
        Ok(CatalogView::new(locations, active_config_by_tenant))
    }
}

#[async_trait]
impl AnalysisEngineService for AnalysisEngineServiceImpl {
    async fn analyze(&self, user: &UserContext, snapshot: Snapshot) -> Result<Report> {
        if snapshot.rows.len() > self.limits.max_snapshot_rows {
            return Err(EngineError::SnapshotTooLarge {
                rows: snapshot.rows.len(),
                limit: self.limits.max_snapshot_rows,
            });
        }

        let _permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| EngineError::Cancelled)?;

        let catalog = self.build_catalog(user).await?;

        let distinct_codes: std::collections::BTreeSet<String> = snapshot
            .rows
            .iter()
            .map(|row| analysis_engine_core::normalize::canonical(&row.location_code))
            .collect();
        let resolution = context_resolver::resolve_tenant(
            &distinct_codes,
            user,
            &catalog,
            self.limits.resolver_policy,
            &BTreeMap::new(),
        );
        let tenant = match &resolution {
            TenantResolution::Tenant(t) => t.clone(),
            TenantResolution::NoMatch => return Ok(Report::no_match("context not identified")),
        };

        let rules = self.rule_repo.active_rules(&tenant).await?;
        let warehouse_config = self.warehouse_config_repo.find_active_for_tenant(&tenant).await?;
        let now = self.clock.now();
        let cancel = CancellationToken::new();

        // `Engine::evaluate` is synchronous and may run for the whole rule
        // timeout budget; run it on a blocking thread so it never starves
        // the async runtime, and race it against `T_total`.
        let engine = self.engine.clone();
        let user_owned = user.clone();
        let resolver_policy = self.limits.resolver_policy;
        let rule_timeout = self.limits.rule_timeout;
        let worker_cancel = cancel.clone();
        let join = tokio::task::spawn_blocking(move || {
            engine.evaluate(EvaluateInput {
                user: &user_owned,
                snapshot: &snapshot,
                rules: &rules,
                catalog: &catalog,
                warehouse_config: warehouse_config.as_ref(),
                now,
                resolver_policy,
                recent_activity: &BTreeMap::new(),
                cancel: &worker_cancel,
                rule_timeout,
            })
        });

        match tokio::time::timeout(self.limits.evaluation_timeout, join).await {
            Ok(Ok(result)) => result,
            Ok(Err(_join_error)) => Err(EngineError::EvaluatorRuntime {
                rule_id: "<unknown>".to_string(),
                message: "evaluator thread panicked".to_string(),
            }),
            Err(_elapsed) => {
                cancel.cancel();
                Err(EngineError::Cancelled)
            },
        }
    }
}
