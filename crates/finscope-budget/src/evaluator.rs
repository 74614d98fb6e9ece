//! Scoped budget evaluation.
//!
//! A cost fans out to every scope it matches: global (if configured), its
//! provider, the single highest-priority matching tag budget, and its exact
//! resource type. Missing configuration at any level means "nothing
//! allocated there", never an error.

use crate::config::{BudgetsConfig, ScopedBudget, TagBudget};
use crate::health::calculate_overall_health;
use crate::scope::ScopeId;
use crate::selector::TagSelector;
use crate::types::{BudgetAllocation, CostLineItem, ScopedBudgetResult, ScopedBudgetStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Provider prefix of a resource type, lower-cased.
///
/// `aws:ec2/instance` → `aws`; a type without `:` is returned whole; an
/// empty string or one starting with `:` yields an empty string.
pub fn extract_provider(resource_type: &str) -> String {
    match resource_type.split_once(':') {
        Some((prefix, _)) => prefix.to_lowercase(),
        None => resource_type.to_lowercase(),
    }
}

/// Outcome of the tag priority tie-break.
#[derive(Debug, Clone, Default)]
pub struct TagSelection<'a> {
    pub selected: Option<&'a TagBudget>,
    pub warning: Option<String>,
}

/// Statuses and per-resource allocations for a batch of line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetEvaluation {
    pub result: ScopedBudgetResult,
    pub allocations: Vec<BudgetAllocation>,
    /// De-duplicated across all allocations, in first-seen order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Read-only view over a [`BudgetsConfig`]. Safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct ScopedBudgetEvaluator<'a> {
    config: Option<&'a BudgetsConfig>,
    providers: HashMap<String, &'a ScopedBudget>,
    tags: Vec<(TagSelector, &'a TagBudget)>,
}

impl<'a> ScopedBudgetEvaluator<'a> {
    /// Index the configuration. Selectors are parsed once here; malformed
    /// ones are logged and never match.
    pub fn new(config: Option<&'a BudgetsConfig>) -> Self {
        let Some(cfg) = config else {
            return Self::default();
        };

        let mut providers = HashMap::new();
        // BTreeMap order makes the winner of a case-only collision stable.
        for (name, budget) in &cfg.providers {
            let lower = name.to_lowercase();
            if providers.contains_key(&lower) {
                tracing::warn!(
                    provider = %name,
                    "duplicate provider budget (case-insensitive); keeping the first"
                );
                continue;
            }
            providers.insert(lower, budget);
        }

        let mut tags = Vec::with_capacity(cfg.tags.len());
        for tb in &cfg.tags {
            match TagSelector::parse(&tb.selector) {
                Ok(sel) => tags.push((sel, tb)),
                Err(e) => tracing::warn!(error = %e, "ignoring tag budget"),
            }
        }

        Self {
            config: Some(cfg),
            providers,
            tags,
        }
    }

    pub fn global_budget(&self) -> Option<&'a ScopedBudget> {
        self.config.and_then(|c| c.global.as_ref())
    }

    /// Case-insensitive provider lookup.
    pub fn get_provider_budget(&self, provider: &str) -> Option<&'a ScopedBudget> {
        self.providers.get(&provider.to_lowercase()).copied()
    }

    /// Exact, case-sensitive resource type lookup.
    pub fn get_type_budget(&self, resource_type: &str) -> Option<&'a ScopedBudget> {
        self.config.and_then(|c| c.types.get(resource_type))
    }

    /// Every tag budget whose selector matches `tags`, highest priority
    /// first. Equal priorities keep configuration order.
    pub fn match_tag_budgets(&self, tags: &BTreeMap<String, String>) -> Vec<&'a TagBudget> {
        let mut matches: Vec<&'a TagBudget> = self
            .tags
            .iter()
            .filter(|(sel, _)| sel.matches(tags))
            .map(|(_, tb)| *tb)
            .collect();
        matches.sort_by(|a, b| b.priority.cmp(&a.priority));
        matches
    }

    /// Pick the single highest-priority match. A tie at the top goes to the
    /// alphabetically first selector and produces a warning.
    pub fn select_highest_priority_tag_budget(matches: &[&'a TagBudget]) -> TagSelection<'a> {
        let Some(top) = matches.iter().map(|tb| tb.priority).max() else {
            return TagSelection::default();
        };
        let mut tied: Vec<&'a TagBudget> = matches
            .iter()
            .copied()
            .filter(|tb| tb.priority == top)
            .collect();
        tied.sort_by(|a, b| a.selector.cmp(&b.selector));
        tied.dedup_by(|a, b| a.selector == b.selector);

        let selected = tied[0];
        let warning = (tied.len() > 1).then(|| {
            let names: Vec<&str> = tied.iter().map(|tb| tb.selector.as_str()).collect();
            format!(
                "{} tag budgets match at priority {top} ({}); using {}",
                tied.len(),
                names.join(", "),
                selected.selector
            )
        });
        TagSelection {
            selected: Some(selected),
            warning,
        }
    }

    /// Count the cost against the allocation's provider if it has a budget.
    pub fn allocate_cost_to_provider(&self, allocation: &mut BudgetAllocation) -> bool {
        if allocation.provider.is_empty() {
            return false;
        }
        if self.get_provider_budget(&allocation.provider).is_none() {
            return false;
        }
        allocation
            .allocated_scopes
            .push(ScopeId::Provider(allocation.provider.to_lowercase()));
        true
    }

    /// Record every matching selector and count the cost against the one
    /// chosen by priority.
    pub fn allocate_cost_to_tag(
        &self,
        allocation: &mut BudgetAllocation,
        tags: &BTreeMap<String, String>,
    ) -> bool {
        let matches = self.match_tag_budgets(tags);
        allocation.matched_tags = matches.iter().map(|tb| tb.selector.clone()).collect();
        let selection = Self::select_highest_priority_tag_budget(&matches);
        if let Some(warning) = selection.warning {
            tracing::warn!(resource = %allocation.resource_id, "{warning}");
            allocation.warnings.push(warning);
        }
        match selection.selected {
            Some(tb) => {
                allocation.selected_tag_budget = Some(tb.selector.clone());
                allocation
                    .allocated_scopes
                    .push(ScopeId::Tag(tb.selector.clone()));
                true
            }
            None => false,
        }
    }

    pub fn allocate_cost_to_type(&self, allocation: &mut BudgetAllocation) -> bool {
        if self.get_type_budget(&allocation.resource_type).is_none() {
            return false;
        }
        allocation
            .allocated_scopes
            .push(ScopeId::Type(allocation.resource_type.clone()));
        true
    }

    /// Build the full allocation for one resource.
    pub fn allocate_costs(&self, item: &CostLineItem) -> BudgetAllocation {
        let mut allocation = BudgetAllocation {
            resource_id: item.resource_id.clone(),
            resource_type: item.resource_type.clone(),
            provider: extract_provider(&item.resource_type),
            cost: item.monthly_cost,
            ..Default::default()
        };
        if self.global_budget().is_some() {
            allocation.allocated_scopes.push(ScopeId::Global);
        }
        self.allocate_cost_to_provider(&mut allocation);
        self.allocate_cost_to_tag(&mut allocation, &item.tags);
        self.allocate_cost_to_type(&mut allocation);
        allocation
    }

    /// Allocate every item and roll spend up into one status per configured
    /// scope.
    pub fn evaluate(&self, items: &[CostLineItem]) -> BudgetEvaluation {
        let allocations: Vec<BudgetAllocation> =
            items.iter().map(|item| self.allocate_costs(item)).collect();

        let mut spend: HashMap<&ScopeId, f64> = HashMap::new();
        let mut warnings: Vec<String> = Vec::new();
        for alloc in &allocations {
            for scope in &alloc.allocated_scopes {
                *spend.entry(scope).or_insert(0.0) += alloc.cost;
            }
            for w in &alloc.warnings {
                if !warnings.contains(w) {
                    warnings.push(w.clone());
                }
            }
        }
        let spent = |scope: &ScopeId| spend.get(scope).copied().unwrap_or(0.0);
        let status = |scope: ScopeId, budget: &ScopedBudget| {
            ScopedBudgetStatus::new(&scope, budget.amount, spent(&scope), &budget.currency)
        };

        let mut result = ScopedBudgetResult::default();
        if let Some(cfg) = self.config {
            result.global = cfg.global.as_ref().map(|b| status(ScopeId::Global, b));
            for (name, &budget) in &self.providers {
                result
                    .by_provider
                    .insert(name.clone(), status(ScopeId::Provider(name.clone()), budget));
            }
            result.by_tag = cfg
                .tags
                .iter()
                .map(|tb| status(ScopeId::Tag(tb.selector.clone()), &tb.budget))
                .collect();
            for (rtype, budget) in &cfg.types {
                result
                    .by_type
                    .insert(rtype.clone(), status(ScopeId::Type(rtype.clone()), budget));
            }
        }
        result.overall_health = calculate_overall_health(&result);

        tracing::debug!(
            items = items.len(),
            overall = %result.overall_health,
            warnings = warnings.len(),
            "budget evaluation complete"
        );
        BudgetEvaluation {
            result,
            allocations,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::BudgetHealth;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn item(id: &str, rtype: &str, cost: f64, t: &[(&str, &str)]) -> CostLineItem {
        CostLineItem {
            resource_id: id.into(),
            resource_type: rtype.into(),
            monthly_cost: cost,
            currency: "USD".into(),
            tags: tags(t),
        }
    }

    fn full_config() -> BudgetsConfig {
        BudgetsConfig {
            global: Some(ScopedBudget::new(10_000.0, "USD")),
            providers: BTreeMap::from([("AWS".to_string(), ScopedBudget::new(5_000.0, "USD"))]),
            tags: vec![TagBudget::new("team:platform", 100, ScopedBudget::new(2_000.0, "USD"))],
            types: BTreeMap::from([(
                "aws:ec2/instance".to_string(),
                ScopedBudget::new(1_000.0, "USD"),
            )]),
        }
    }

    fn ids(alloc: &BudgetAllocation) -> Vec<String> {
        alloc.allocated_scopes.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn extract_provider_edge_cases() {
        assert_eq!(extract_provider("aws:ec2/instance"), "aws");
        assert_eq!(extract_provider("AWS:ec2/instance"), "aws");
        assert_eq!(extract_provider("unknown"), "unknown");
        assert_eq!(extract_provider(""), "");
        assert_eq!(extract_provider(":x"), "");
    }

    #[test]
    fn provider_lookup_is_case_insensitive_type_lookup_is_exact() {
        let cfg = full_config();
        let ev = ScopedBudgetEvaluator::new(Some(&cfg));
        assert!(ev.get_provider_budget("aws").is_some());
        assert!(ev.get_provider_budget("Aws").is_some());
        assert!(ev.get_provider_budget("gcp").is_none());
        assert!(ev.get_type_budget("aws:ec2/instance").is_some());
        assert!(ev.get_type_budget("AWS:EC2/Instance").is_none());
    }

    #[test]
    fn fan_out_to_all_four_scopes() {
        let cfg = full_config();
        let ev = ScopedBudgetEvaluator::new(Some(&cfg));
        let alloc = ev.allocate_costs(&item(
            "i-123",
            "aws:ec2/instance",
            100.0,
            &[("team", "platform")],
        ));
        assert_eq!(
            ids(&alloc),
            vec![
                "global",
                "provider:aws",
                "tag:team:platform",
                "type:aws:ec2/instance"
            ]
        );
        assert_eq!(alloc.provider, "aws");
        assert_eq!(alloc.selected_tag_budget.as_deref(), Some("team:platform"));
        assert!(alloc.warnings.is_empty());
    }

    #[test]
    fn unmatched_resource_falls_back_to_global() {
        let cfg = full_config();
        let ev = ScopedBudgetEvaluator::new(Some(&cfg));
        let alloc = ev.allocate_costs(&item("b-1", "gcp:storage/bucket", 5.0, &[]));
        assert_eq!(ids(&alloc), vec!["global"]);
    }

    #[test]
    fn unconfigured_evaluator_allocates_nothing() {
        let ev = ScopedBudgetEvaluator::new(None);
        assert!(ev.get_provider_budget("aws").is_none());
        assert!(ev.get_type_budget("aws:ec2/instance").is_none());
        let alloc = ev.allocate_costs(&item("i-1", "aws:ec2/instance", 1.0, &[("team", "x")]));
        assert!(alloc.allocated_scopes.is_empty());

        let eval = ev.evaluate(&[item("i-1", "aws:ec2/instance", 1.0, &[])]);
        assert_eq!(eval.result.overall_health, BudgetHealth::Unspecified);
        assert_eq!(eval.allocations.len(), 1);
    }

    #[test]
    fn priority_tie_picks_alphabetical_first_with_one_warning() {
        let platform = TagBudget::new("team:platform", 100, ScopedBudget::new(1.0, "USD"));
        let backend = TagBudget::new("team:backend", 100, ScopedBudget::new(1.0, "USD"));
        let sel = ScopedBudgetEvaluator::select_highest_priority_tag_budget(&[&platform, &backend]);
        assert_eq!(sel.selected.unwrap().selector, "team:backend");
        let warning = sel.warning.unwrap();
        assert!(warning.contains("priority 100"), "{warning}");
        assert!(warning.contains("team:platform"));
    }

    #[test]
    fn no_matches_selects_nothing() {
        let sel = ScopedBudgetEvaluator::select_highest_priority_tag_budget(&[]);
        assert!(sel.selected.is_none());
        assert!(sel.warning.is_none());
    }

    #[test]
    fn wildcard_tie_is_resolved_during_allocation() {
        let cfg = BudgetsConfig {
            tags: vec![
                TagBudget::new("team:*", 50, ScopedBudget::new(1.0, "USD")),
                TagBudget::new("env:prod", 50, ScopedBudget::new(1.0, "USD")),
                TagBudget::new("cost-center:*", 10, ScopedBudget::new(1.0, "USD")),
            ],
            ..Default::default()
        };
        let ev = ScopedBudgetEvaluator::new(Some(&cfg));
        let alloc = ev.allocate_costs(&item(
            "db-1",
            "aws:rds/instance",
            20.0,
            &[("team", "data"), ("env", "prod"), ("cost-center", "42")],
        ));
        assert_eq!(alloc.matched_tags, vec!["team:*", "env:prod", "cost-center:*"]);
        assert_eq!(alloc.selected_tag_budget.as_deref(), Some("env:prod"));
        assert_eq!(ids(&alloc), vec!["tag:env:prod"]);
        assert_eq!(alloc.warnings.len(), 1);
        assert!(alloc.warnings[0].contains("priority 50"));
    }

    #[test]
    fn higher_priority_wins_without_warning() {
        let cfg = BudgetsConfig {
            tags: vec![
                TagBudget::new("env:*", 1, ScopedBudget::new(1.0, "USD")),
                TagBudget::new("env:prod", 10, ScopedBudget::new(1.0, "USD")),
            ],
            ..Default::default()
        };
        let ev = ScopedBudgetEvaluator::new(Some(&cfg));
        let matches = ev.match_tag_budgets(&tags(&[("env", "prod")]));
        let selectors: Vec<&str> = matches.iter().map(|t| t.selector.as_str()).collect();
        assert_eq!(selectors, vec!["env:prod", "env:*"]);
        let sel = ScopedBudgetEvaluator::select_highest_priority_tag_budget(&matches);
        assert_eq!(sel.selected.unwrap().selector, "env:prod");
        assert!(sel.warning.is_none());
    }

    #[test]
    fn malformed_selector_never_matches() {
        let cfg = BudgetsConfig {
            tags: vec![TagBudget::new("team", 100, ScopedBudget::new(1.0, "USD"))],
            ..Default::default()
        };
        let ev = ScopedBudgetEvaluator::new(Some(&cfg));
        assert!(ev.match_tag_budgets(&tags(&[("team", "x")])).is_empty());
    }

    #[test]
    fn evaluate_accumulates_spend_per_scope() {
        let cfg = full_config();
        let ev = ScopedBudgetEvaluator::new(Some(&cfg));
        let items = [
            item("i-1", "aws:ec2/instance", 600.0, &[("team", "platform")]),
            item("i-2", "aws:ec2/instance", 350.0, &[]),
            item("b-1", "aws:s3/bucket", 50.0, &[("team", "platform")]),
            item("vm-1", "gcp:compute/instance", 100.0, &[]),
        ];
        let eval = ev.evaluate(&items);
        let r = &eval.result;

        let global = r.global.as_ref().unwrap();
        assert_eq!(global.current_spend, 1100.0);
        assert_eq!(global.health, BudgetHealth::Ok);

        let aws = &r.by_provider["aws"];
        assert_eq!(aws.current_spend, 1000.0);
        assert_eq!(aws.percentage, 20.0);

        assert_eq!(r.by_tag.len(), 1);
        assert_eq!(r.by_tag[0].scope_key, "team:platform");
        assert_eq!(r.by_tag[0].current_spend, 650.0);

        let ec2 = &r.by_type["aws:ec2/instance"];
        assert_eq!(ec2.current_spend, 950.0);
        assert_eq!(ec2.health, BudgetHealth::Critical);

        assert_eq!(r.overall_health, BudgetHealth::Critical);
        assert_eq!(eval.allocations.len(), 4);
    }

    #[test]
    fn evaluator_is_shareable_across_threads() {
        let cfg = full_config();
        let ev = ScopedBudgetEvaluator::new(Some(&cfg));
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let ev = &ev;
                    s.spawn(move || {
                        ev.allocate_costs(&item(&format!("i-{i}"), "aws:ec2/instance", 1.0, &[]))
                    })
                })
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap().allocated_scopes.len(), 3);
            }
        });
    }
}
