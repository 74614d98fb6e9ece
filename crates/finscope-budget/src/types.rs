use crate::health::BudgetHealth;
use crate::scope::{ScopeId, ScopeType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One priced resource, as delivered by the cost source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLineItem {
    pub resource_id: String,
    pub resource_type: String,
    pub monthly_cost: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Spend against one scope's limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedBudgetStatus {
    pub scope_type: ScopeType,
    pub scope_key: String,
    pub limit: f64,
    pub current_spend: f64,
    pub percentage: f64,
    pub health: BudgetHealth,
    pub currency: String,
}

impl ScopedBudgetStatus {
    /// Build a status for `scope`, deriving percentage and health.
    /// A non-positive limit yields 0%.
    pub fn new(scope: &ScopeId, limit: f64, current_spend: f64, currency: &str) -> Self {
        let percentage = if limit > 0.0 {
            current_spend * 100.0 / limit
        } else {
            0.0
        };
        Self {
            scope_type: scope.scope_type(),
            scope_key: scope.key().to_string(),
            limit,
            current_spend,
            percentage,
            health: crate::health::calculate_health_from_percentage(percentage),
            currency: currency.to_string(),
        }
    }

    pub fn scope_id(&self) -> ScopeId {
        match self.scope_type {
            ScopeType::Global => ScopeId::Global,
            ScopeType::Provider => ScopeId::Provider(self.scope_key.clone()),
            ScopeType::Tag => ScopeId::Tag(self.scope_key.clone()),
            ScopeType::Type => ScopeId::Type(self.scope_key.clone()),
        }
    }
}

/// Per-scope statuses for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopedBudgetResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<ScopedBudgetStatus>,
    #[serde(default)]
    pub by_provider: BTreeMap<String, ScopedBudgetStatus>,
    /// In configuration order.
    #[serde(default)]
    pub by_tag: Vec<ScopedBudgetStatus>,
    #[serde(default)]
    pub by_type: BTreeMap<String, ScopedBudgetStatus>,
    pub overall_health: BudgetHealth,
}

impl ScopedBudgetResult {
    /// Every status in a fixed order: global, providers, tags, types.
    pub fn statuses(&self) -> impl Iterator<Item = &ScopedBudgetStatus> {
        self.global
            .iter()
            .chain(self.by_provider.values())
            .chain(self.by_tag.iter())
            .chain(self.by_type.values())
    }
}

/// Where one resource's cost was counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetAllocation {
    pub resource_id: String,
    pub resource_type: String,
    pub provider: String,
    pub cost: f64,
    pub allocated_scopes: Vec<ScopeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_tag_budget: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl BudgetAllocation {
    pub fn is_allocated_to(&self, scope: &ScopeId) -> bool {
        self.allocated_scopes.contains(scope)
    }
}
