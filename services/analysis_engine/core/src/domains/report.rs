//! Analysis report (`Report`).

use crate::domains::anomaly::Anomaly;
use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved tenant for an evaluation, or the explicit "no confident match"
/// outcome of the context resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantResolution {
    Tenant(String),
    NoMatch,
}

impl TenantResolution {
    pub fn as_tenant(&self) -> Option<&str> {
        match self {
            TenantResolution::Tenant(t) => Some(t),
            TenantResolution::NoMatch => None,
        }
    }
}

/// Per-rule performance/error counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleStat {
    pub count: usize,
    pub duration_ms: u64,
    pub errored: bool,
    pub error_kind: Option<ErrorKind>,
}

/// The result of one `Engine::evaluate` call (`Report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub tenant: TenantResolution,
    pub anomalies: Vec<Anomaly>,
    pub rules_used: Vec<String>,
    pub per_rule_stats: BTreeMap<String, RuleStat>,
    pub warnings: Vec<String>,
}

impl Report {
    pub fn no_match(warning: impl Into<String>) -> Self {
        Self {
            tenant: TenantResolution::NoMatch,
            anomalies: Vec::new(),
            rules_used: Vec::new(),
            per_rule_stats: BTreeMap::new(),
            warnings: vec![warning.into()],
        }
    }
}
