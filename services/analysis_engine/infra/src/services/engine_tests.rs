//! Unit tests for `AnalysisEngineServiceImpl` using mocked repositories.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockall::mock;

use analysis_engine_core::clock::FixedClock;
use analysis_engine_core::context_resolver::ResolverPolicy;
use analysis_engine_core::domains::inventory_row::{InventoryRow, Snapshot};
use analysis_engine_core::domains::location::{Location, LocationType};
use analysis_engine_core::domains::report::TenantResolution;
use analysis_engine_core::domains::rule::Rule;
use analysis_engine_core::domains::user_context::UserContext;
use analysis_engine_core::domains::warehouse_config::WarehouseConfig;
use analysis_engine_core::error::{EngineError, Result};
use analysis_engine_core::repositories::location::LocationRepository;
use analysis_engine_core::repositories::rule::RuleRepository;
use analysis_engine_core::repositories::warehouse_config::WarehouseConfigRepository;
use analysis_engine_core::services::engine::AnalysisEngineService;

use super::engine::{AnalysisEngineServiceImpl, ResourceLimits};

mock! {
    pub LocationRepositoryImpl {}
    #[async_trait]
    impl LocationRepository for LocationRepositoryImpl {
        async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<Location>>;
        async fn active_config_id(&self, tenant_id: &str) -> Result<Option<String>>;
    }
}

mock! {
    pub RuleRepositoryImpl {}
    #[async_trait]
    impl RuleRepository for RuleRepositoryImpl {
        async fn active_rules(&self, tenant_id: &str) -> Result<Vec<Rule>>;
    }
}

mock! {
    pub WarehouseConfigRepositoryImpl {}
    #[async_trait]
    impl WarehouseConfigRepository for WarehouseConfigRepositoryImpl {
        async fn find_by_id(&self, config_id: &str) -> Result<Option<WarehouseConfig>>;
        async fn find_active_for_tenant(&self, tenant_id: &str) -> Result<Option<WarehouseConfig>>;
    }
}

fn test_limits() -> ResourceLimits {
    ResourceLimits {
        concurrency: 4,
        evaluation_timeout: Duration::from_secs(5),
        rule_timeout: Duration::from_secs(1),
        max_snapshot_rows: 10,
        resolver_policy: ResolverPolicy::default(),
    }
}

fn loc(tenant: &str, code: &str) -> Location {
    Location {
        code: code.to_string(),
        warehouse_id: tenant.to_string(),
        warehouse_config_id: None,
        location_type: LocationType::Storage,
        capacity: 100,
        zone: "GENERAL".to_string(),
        pattern: None,
        allowed_products: vec![],
        special_requirements: BTreeMap::new(),
        structure: None,
        is_active: true,
    }
}

fn row(pallet: &str, code: &str) -> InventoryRow {
    InventoryRow {
        pallet_id: pallet.to_string(),
        location_code: code.to_string(),
        description: "GENERAL".to_string(),
        receipt_number: "R1".to_string(),
        creation_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn user(tenants: &[&str]) -> UserContext {
    UserContext {
        user_id: "u1".to_string(),
        accessible_tenants: tenants.iter().map(|t| t.to_string()).collect(),
        default_tenant: None,
    }
}

#[tokio::test]
async fn analyze_rejects_snapshot_over_row_limit_without_touching_repositories() {
    let mut location_repo = MockLocationRepositoryImpl::new();
    location_repo.expect_list_for_tenant().times(0);
    let mut rule_repo = MockRuleRepositoryImpl::new();
    rule_repo.expect_active_rules().times(0);
    let mut warehouse_config_repo = MockWarehouseConfigRepositoryImpl::new();
    warehouse_config_repo.expect_find_active_for_tenant().times(0);

    let service = AnalysisEngineServiceImpl::new(
        Arc::new(location_repo),
        Arc::new(warehouse_config_repo),
        Arc::new(rule_repo),
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())),
        test_limits(),
    );

    let snapshot = Snapshot { rows: (0..20).map(|n| row(&format!("P{n}"), "RECV-01")).collect() };

    let err = service.analyze(&user(&["T1"]), snapshot).await.unwrap_err();
    assert!(matches!(err, EngineError::SnapshotTooLarge { rows: 20, limit: 10 }));
}

#[tokio::test]
async fn analyze_returns_no_match_report_when_catalog_has_no_coverage() {
    let mut location_repo = MockLocationRepositoryImpl::new();
    location_repo.expect_list_for_tenant().returning(|_| Ok(vec![]));
    location_repo.expect_active_config_id().returning(|_| Ok(None));

    let mut rule_repo = MockRuleRepositoryImpl::new();
    rule_repo.expect_active_rules().times(0);
    let mut warehouse_config_repo = MockWarehouseConfigRepositoryImpl::new();
    warehouse_config_repo.expect_find_active_for_tenant().times(0);

    let service = AnalysisEngineServiceImpl::new(
        Arc::new(location_repo),
        Arc::new(warehouse_config_repo),
        Arc::new(rule_repo),
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())),
        test_limits(),
    );

    let snapshot = Snapshot { rows: vec![row("P1", "RECV-01")] };
    let report = service.analyze(&user(&["T1"]), snapshot).await.unwrap();

    assert_eq!(report.tenant, TenantResolution::NoMatch);
    assert!(!report.warnings.is_empty());
}

#[tokio::test]
async fn analyze_resolves_tenant_and_runs_rules_against_a_confident_match() {
    let locations: Vec<Location> = (1..=6).map(|n| loc("T1", &format!("LOC-{n:02}"))).collect();

    let mut location_repo = MockLocationRepositoryImpl::new();
    location_repo.expect_list_for_tenant().returning(move |_| Ok(locations.clone()));
    location_repo.expect_active_config_id().returning(|_| Ok(None));

    let mut rule_repo = MockRuleRepositoryImpl::new();
    rule_repo.expect_active_rules().returning(|_| Ok(vec![]));

    let mut warehouse_config_repo = MockWarehouseConfigRepositoryImpl::new();
    warehouse_config_repo.expect_find_active_for_tenant().returning(|_| Ok(None));

    let service = AnalysisEngineServiceImpl::new(
        Arc::new(location_repo),
        Arc::new(warehouse_config_repo),
        Arc::new(rule_repo),
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())),
        test_limits(),
    );

    let snapshot =
        Snapshot { rows: (1..=6).map(|n| row(&format!("P{n}"), &format!("LOC-{n:02}"))).collect() };

    let report = service.analyze(&user(&["T1"]), snapshot).await.unwrap();

    assert_eq!(report.tenant, TenantResolution::Tenant("T1".to_string()));
    assert!(report.anomalies.is_empty());
}
