//! Location Catalog.
//!
//! `CatalogView` is an immutable snapshot built once per evaluation:
//! `resolve` is a pure function of the catalog snapshot taken at engine
//! start. Locations are keyed by the composite `(tenant_id, code)` so
//! cross-tenant reads are structurally impossible — there is no code path
//! that can look up a location without naming its tenant.

use crate::domains::location::{Location, LocationType};
use crate::normalize::{canonical, glob_match};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct CatalogView {
    locations: Vec<Location>,
    by_key: BTreeMap<(String, String), usize>,
    /// Active `warehouse_config_id` selected for this evaluation's user, per
    /// tenant. `None` for a tenant means no config is selected for that
    /// tenant (only orphan locations are visible there).
    active_config_by_tenant: BTreeMap<String, Option<String>>,
}

impl CatalogView {
    pub fn new(
        locations: Vec<Location>,
        active_config_by_tenant: BTreeMap<String, Option<String>>,
    ) -> Self {
        let mut by_key = BTreeMap::new();
        for (idx, loc) in locations.iter().enumerate() {
            by_key.insert((loc.warehouse_id.clone(), loc.code.clone()), idx);
        }
        Self { locations, by_key, active_config_by_tenant }
    }

    fn is_visible(&self, loc: &Location) -> bool {
        match self.active_config_by_tenant.get(&loc.warehouse_id) {
            Some(Some(active)) => {
                loc.warehouse_config_id.is_none() || loc.warehouse_config_id.as_deref() == Some(active.as_str())
            },
            Some(None) | None => loc.warehouse_config_id.is_none(),
        }
    }

    /// Exact match on the canonicalized code. Never scans patterns — the
    /// INVALID_LOCATION evaluator relies on that to tell "undefined" from
    /// "resolves via pattern".
    pub fn get_by_code(&self, tenant: &str, code: &str) -> Option<&Location> {
        let c = canonical(code);
        let idx = *self.by_key.get(&(tenant.to_string(), c))?;
        let loc = &self.locations[idx];
        self.is_visible(loc).then_some(loc)
    }

    /// Exact match, else best-specificity pattern match.
    pub fn resolve(&self, tenant: &str, raw_code: &str) -> Option<&Location> {
        let c = canonical(raw_code);
        if let Some(loc) = self.get_by_code(tenant, &c) {
            return Some(loc);
        }

        let mut candidates: Vec<&Location> = self
            .locations
            .iter()
            .filter(|loc| loc.warehouse_id == tenant && self.is_visible(loc))
            .filter_map(|loc| loc.pattern.as_deref().map(|p| (loc, p)))
            .filter(|(_, pattern)| glob_match(pattern, &c))
            .map(|(loc, _)| loc)
            .collect();

        if candidates.is_empty() {
            return None;
        }

        candidates.sort_by(|a, b| {
            let spec_a = pattern_specificity(a.pattern.as_deref().unwrap_or(""));
            let spec_b = pattern_specificity(b.pattern.as_deref().unwrap_or(""));
            spec_b
                .cmp(&spec_a)
                .then_with(|| b.is_active.cmp(&a.is_active))
                .then_with(|| a.code.cmp(&b.code))
        });

        candidates.into_iter().next()
    }

    pub fn count_by(&self, tenant: &str, location_type: LocationType) -> usize {
        self.locations
            .iter()
            .filter(|loc| loc.warehouse_id == tenant && self.is_visible(loc))
            .filter(|loc| loc.location_type == location_type)
            .count()
    }

    pub fn iter_active(&self, tenant: &str) -> impl Iterator<Item = &Location> {
        self.locations
            .iter()
            .filter(move |loc| loc.warehouse_id == tenant && self.is_visible(loc) && loc.is_active)
    }
}

/// Count of non-glob-metacharacter characters in a pattern — more literal
/// characters means a more specific match.
fn pattern_specificity(pattern: &str) -> usize {
    pattern.chars().filter(|c| !matches!(c, '*' | '?')).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn loc(tenant: &str, code: &str, pattern: Option<&str>) -> Location {
        Location {
            code: code.to_string(),
            warehouse_id: tenant.to_string(),
            warehouse_config_id: None,
            location_type: LocationType::Storage,
            capacity: 1,
            zone: "GENERAL".to_string(),
            pattern: pattern.map(str::to_string),
            allowed_products: vec![],
            special_requirements: Map::new(),
            structure: None,
            is_active: true,
        }
    }

    #[test]
    fn composite_uniqueness_across_tenants() {
        let locations = vec![loc("T1", "W-01", None), loc("T2", "W-01", None)];
        let view = CatalogView::new(locations, Map::new());
        assert_eq!(view.get_by_code("T1", "W-01").unwrap().warehouse_id, "T1");
        assert_eq!(view.get_by_code("T2", "W-01").unwrap().warehouse_id, "T2");
    }

    #[test]
    fn resolve_prefers_exact_then_most_specific_pattern() {
        let mut wildcard = loc("T1", "RECV-ANY", Some("RECV-*"));
        wildcard.code = "RECV-ANY".to_string();
        let mut specific = loc("T1", "RECV-SPECIFIC", Some("RECV-0?"));
        specific.code = "RECV-SPECIFIC".to_string();
        let view = CatalogView::new(vec![wildcard, specific], Map::new());

        let resolved = view.resolve("T1", "recv-01").unwrap();
        assert_eq!(resolved.code, "RECV-SPECIFIC");
    }

    #[test]
    fn resolve_is_pure_given_raw_or_canonical_input() {
        let view = CatalogView::new(vec![loc("T1", "RECV-01", None)], Map::new());
        assert_eq!(
            view.resolve("T1", "recv_01").map(|l| l.code.clone()),
            view.resolve("T1", "RECV-01").map(|l| l.code.clone())
        );
    }

    #[test]
    fn orphan_visible_without_active_config() {
        let view = CatalogView::new(vec![loc("T1", "RECV-01", None)], Map::new());
        assert!(view.get_by_code("T1", "RECV-01").is_some());
    }

    #[test]
    fn bound_location_hidden_without_matching_active_config() {
        let mut bound = loc("T1", "RECV-01", None);
        bound.warehouse_config_id = Some("cfg-a".to_string());
        let view = CatalogView::new(vec![bound], Map::new());
        assert!(view.get_by_code("T1", "RECV-01").is_none());
    }
}
