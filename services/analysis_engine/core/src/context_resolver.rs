//! Warehouse Context Resolver.

use crate::catalog::CatalogView;
use crate::domains::report::TenantResolution;
use crate::domains::user_context::UserContext;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Resolver thresholds, exposed as configuration rather than hardcoded.
#[derive(Debug, Clone, Copy)]
pub struct ResolverPolicy {
    pub min_ratio: f64,
    pub min_matches: usize,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self { min_ratio: 0.30, min_matches: 5 }
    }
}

/// Pick the tenant whose catalog best matches the snapshot's distinct raw
/// codes. `recent_activity` is an optional per-tenant "last
/// snapshot seen" timestamp used only to break ties; tenants absent from it
/// sort after tenants present in it during tie-break (b).
pub fn resolve_tenant(
    distinct_codes: &BTreeSet<String>,
    user: &UserContext,
    catalog: &CatalogView,
    policy: ResolverPolicy,
    recent_activity: &BTreeMap<String, DateTime<Utc>>,
) -> TenantResolution {
    let total = distinct_codes.len();
    if total == 0 || user.accessible_tenants.is_empty() {
        return TenantResolution::NoMatch;
    }

    let scores: Vec<(String, usize, f64)> = user
        .accessible_tenants
        .iter()
        .map(|tenant| {
            let matched = distinct_codes
                .iter()
                .filter(|code| catalog.resolve(tenant, code).is_some())
                .count();
            let ratio = matched as f64 / total as f64;
            (tenant.clone(), matched, ratio)
        })
        .collect();

    let Some(best_ratio) =
        scores.iter().map(|(_, _, r)| *r).fold(None::<f64>, |acc, r| match acc {
            Some(a) => Some(a.max(r)),
            None => Some(r),
        })
    else {
        return TenantResolution::NoMatch;
    };

    let mut candidates: Vec<&(String, usize, f64)> =
        scores.iter().filter(|(_, _, r)| (*r - best_ratio).abs() < f64::EPSILON).collect();

    let winner = if candidates.len() == 1 {
        candidates[0].clone()
    } else {
        // (a) user's default tenant
        if let Some(default) = &user.default_tenant {
            if let Some(found) = candidates.iter().find(|(t, _, _)| t == default) {
                (*found).clone()
            } else {
                tie_break_by_activity_then_lex(&mut candidates, recent_activity)
            }
        } else {
            tie_break_by_activity_then_lex(&mut candidates, recent_activity)
        }
    };

    let (tenant, matched, ratio) = winner;
    if ratio >= policy.min_ratio && matched >= policy.min_matches {
        TenantResolution::Tenant(tenant)
    } else {
        TenantResolution::NoMatch
    }
}

fn tie_break_by_activity_then_lex(
    candidates: &mut [&(String, usize, f64)],
    recent_activity: &BTreeMap<String, DateTime<Utc>>,
) -> (String, usize, f64) {
    candidates.sort_by(|a, b| {
        let activity_a = recent_activity.get(&a.0);
        let activity_b = recent_activity.get(&b.0);
        activity_b.cmp(&activity_a).then_with(|| a.0.cmp(&b.0))
    });
    candidates[0].clone()
}
