//! Engine Orchestrator.
//!
//! `Engine::evaluate` is the single entry point: canonicalize, resolve
//! tenant, run rules in store order, correlate, dedup, sort. Per-rule
//! timeout is enforced with a scoped worker thread and `recv_timeout` so
//! a stuck evaluator cannot block the next rule past its budget;
//! the overall per-evaluation budget `T_total` is the caller's
//! responsibility to enforce by cancelling `cancel` (blocking
//! calls on pure data, thread-pool at the service boundary).

use crate::catalog::CatalogView;
use crate::context_resolver::{self, ResolverPolicy};
use crate::domains::anomaly::Anomaly;
use crate::domains::inventory_row::{InventoryRow, Snapshot};
use crate::domains::report::{Report, RuleStat, TenantResolution};
use crate::domains::rule::{Rule, RuleType};
use crate::domains::user_context::UserContext;
use crate::domains::warehouse_config::WarehouseConfig;
use crate::error::{EngineError, ErrorKind, Result};
use crate::evaluators::{EvalContext, Evaluator, Registry};
use crate::normalize;
use crate::rules;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Everything `evaluate` needs for one analysis.
pub struct EvaluateInput<'a> {
    pub user: &'a UserContext,
    pub snapshot: &'a Snapshot,
    pub rules: &'a [Rule],
    pub catalog: &'a CatalogView,
    pub warehouse_config: Option<&'a WarehouseConfig>,
    pub now: DateTime<Utc>,
    pub resolver_policy: ResolverPolicy,
    pub recent_activity: &'a BTreeMap<String, DateTime<Utc>>,
    pub cancel: &'a CancellationToken,
    pub rule_timeout: Duration,
}

#[derive(Default)]
pub struct Engine {
    registry: Registry,
}

impl Engine {
    pub fn evaluate(&self, input: EvaluateInput<'_>) -> Result<Report> {
        // 1. Canonicalize all location codes once.
        let canonical_rows: Vec<InventoryRow> = input
            .snapshot
            .rows
            .iter()
            .map(|row| InventoryRow { location_code: normalize::canonical(&row.location_code), ..row.clone() })
            .collect();
        let canonical_snapshot = Snapshot { rows: canonical_rows };

        let distinct_codes: BTreeSet<String> =
            canonical_snapshot.rows.iter().map(|row| row.location_code.clone()).collect();

        // 2. Resolve tenant; short-circuit on NO_MATCH.
        let resolution = context_resolver::resolve_tenant(
            &distinct_codes,
            input.user,
            input.catalog,
            input.resolver_policy,
            input.recent_activity,
        );
        let tenant = match &resolution {
            TenantResolution::Tenant(t) => t.clone(),
            TenantResolution::NoMatch => return Ok(Report::no_match("context not identified")),
        };

        // 3. Load active rules in store order.
        let ordered_rules = rules::active_rules_in_order(input.rules);

        let mut all_anomalies: Vec<Anomaly> = Vec::new();
        let mut per_rule_stats: BTreeMap<String, RuleStat> = BTreeMap::new();
        let mut rules_used: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        // 4. Run each rule, in order, with per-rule error isolation and timeout.
        for rule in ordered_rules {
            if input.cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            let evaluator = self.registry.get(rule.rule_type);
            let (outcome, elapsed) = run_one_rule(
                evaluator,
                rule,
                &canonical_snapshot,
                &tenant,
                input.catalog,
                input.warehouse_config,
                input.now,
                input.cancel,
                input.rule_timeout,
            );
            rules_used.push(rule.id.clone());

            match outcome {
                RuleOutcome::Anomalies(anomalies) => {
                    tracing::debug!(
                        rule_id = %rule.id,
                        rule_type = %rule.rule_type,
                        duration_ms = elapsed.as_millis() as u64,
                        anomaly_count = anomalies.len(),
                        "rule evaluated"
                    );
                    per_rule_stats.insert(
                        rule.id.clone(),
                        RuleStat {
                            count: anomalies.len(),
                            duration_ms: elapsed.as_millis() as u64,
                            errored: false,
                            error_kind: None,
                        },
                    );
                    all_anomalies.extend(anomalies);
                },
                RuleOutcome::Timeout => {
                    let message = format!("rule {} timed out after {}ms", rule.id, input.rule_timeout.as_millis());
                    tracing::warn!(rule_id = %rule.id, rule_type = %rule.rule_type, "{message}");
                    warnings.push(message);
                    per_rule_stats.insert(
                        rule.id.clone(),
                        RuleStat {
                            count: 0,
                            duration_ms: elapsed.as_millis() as u64,
                            errored: true,
                            error_kind: Some(ErrorKind::Timeout),
                        },
                    );
                },
                RuleOutcome::Runtime(message) => {
                    let warning = format!("rule {} errored: {message}", rule.id);
                    tracing::warn!(rule_id = %rule.id, rule_type = %rule.rule_type, "{warning}");
                    warnings.push(warning);
                    per_rule_stats.insert(
                        rule.id.clone(),
                        RuleStat {
                            count: 0,
                            duration_ms: elapsed.as_millis() as u64,
                            errored: true,
                            error_kind: Some(ErrorKind::Runtime),
                        },
                    );
                },
                RuleOutcome::Cancelled => return Err(EngineError::Cancelled),
            }
        }

        // 5. Correlation pass: no new anomalies, only links.
        correlate(&mut all_anomalies);

        // 6. Dedup by (rule_id, pallet_id, location_code), keep first emitted.
        let deduped = dedup(all_anomalies);

        // 7. Sort by the canonical ordering.
        let mut sorted = deduped;
        sorted.sort_by_key(Anomaly::sort_key);

        Ok(Report { tenant: resolution, anomalies: sorted, rules_used, per_rule_stats, warnings })
    }
}

enum RuleOutcome {
    Anomalies(Vec<Anomaly>),
    Timeout,
    Runtime(String),
    Cancelled,
}

/// Runs one evaluator on a scoped worker thread so a timeout can actually
/// preempt a stuck rule without poisoning the next one. The worker observes
/// cancellation through a child token; on timeout we cancel it so the
/// worker unwinds before the scope has to join it.
#[allow(clippy::too_many_arguments)]
fn run_one_rule(
    evaluator: &dyn Evaluator,
    rule: &Rule,
    snapshot: &Snapshot,
    tenant: &str,
    catalog: &CatalogView,
    warehouse_config: Option<&WarehouseConfig>,
    now: DateTime<Utc>,
    parent_cancel: &CancellationToken,
    budget: Duration,
) -> (RuleOutcome, Duration) {
    let child = parent_cancel.child_token();
    let start = Instant::now();

    let outcome = thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();
        let ctx = EvalContext { tenant, catalog, warehouse_config, now, cancel: &child };
        scope.spawn(|| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(rule, snapshot, &ctx)));
            let _ = tx.send(result);
        });

        match rx.recv_timeout(budget) {
            Ok(Ok(Ok(anomalies))) => RuleOutcome::Anomalies(anomalies),
            Ok(Ok(Err(EngineError::Cancelled))) => {
                if parent_cancel.is_cancelled() {
                    RuleOutcome::Cancelled
                } else {
                    RuleOutcome::Timeout
                }
            },
            Ok(Ok(Err(err))) => RuleOutcome::Runtime(err.to_string()),
            Ok(Err(_panic_payload)) => RuleOutcome::Runtime("evaluator panicked".to_string()),
            Err(_recv_timeout) => {
                child.cancel();
                RuleOutcome::Timeout
            },
        }
    });

    (outcome, start.elapsed())
}

/// A stable per-anomaly reference for `correlated_anomaly_ids` — anomalies
/// have no independent identity before persistence, so this is derived from
/// the dedup key — correlation only links, it never synthesizes anomalies.
fn anomaly_ref(anomaly: &Anomaly) -> String {
    let (rule_id, pallet_id, location_code) = anomaly.dedup_key();
    format!("{rule_id}|{pallet_id}|{location_code}")
}

fn correlate(anomalies: &mut [Anomaly]) {
    let ids: Vec<String> = anomalies.iter().map(anomaly_ref).collect();

    let mut stagnant_by_pallet: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut overcapacity_by_pallet: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, anomaly) in anomalies.iter().enumerate() {
        if anomaly.rule_type == RuleType::StagnantPallets.to_string() {
            stagnant_by_pallet.entry(anomaly.pallet_id.clone()).or_default().push(idx);
        } else if anomaly.rule_type == RuleType::Overcapacity.to_string() {
            overcapacity_by_pallet.entry(anomaly.pallet_id.clone()).or_default().push(idx);
        }
    }

    for (pallet, stagnant_idxs) in &stagnant_by_pallet {
        let Some(overcapacity_idxs) = overcapacity_by_pallet.get(pallet) else { continue };
        for &si in stagnant_idxs {
            for &oi in overcapacity_idxs {
                let over_id = ids[oi].clone();
                let stag_id = ids[si].clone();
                if !anomalies[si].correlated_anomaly_ids.contains(&over_id) {
                    anomalies[si].correlated_anomaly_ids.push(over_id);
                }
                if !anomalies[oi].correlated_anomaly_ids.contains(&stag_id) {
                    anomalies[oi].correlated_anomaly_ids.push(stag_id);
                }
            }
        }
    }
}

fn dedup(anomalies: Vec<Anomaly>) -> Vec<Anomaly> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(anomalies.len());
    for anomaly in anomalies {
        if seen.insert(anomaly.dedup_key()) {
            out.push(anomaly);
        }
    }
    out
}
