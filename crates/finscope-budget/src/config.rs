use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A spending limit for one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedBudget {
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// A budget attached to a tag selector. Higher priority wins when several
/// selectors match the same resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagBudget {
    pub selector: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(flatten)]
    pub budget: ScopedBudget,
}

/// The budget hierarchy. Provider names are matched case-insensitively,
/// resource types exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<ScopedBudget>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<String, ScopedBudget>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagBudget>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub types: BTreeMap<String, ScopedBudget>,
}

impl ScopedBudget {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

impl TagBudget {
    pub fn new(selector: impl Into<String>, priority: i32, budget: ScopedBudget) -> Self {
        Self {
            selector: selector.into(),
            priority,
            budget,
        }
    }
}

impl BudgetsConfig {
    /// True when no scope carries a budget.
    pub fn is_empty(&self) -> bool {
        self.global.is_none()
            && self.providers.is_empty()
            && self.tags.is_empty()
            && self.types.is_empty()
    }
}

fn default_currency() -> String {
    "USD".to_string()
}
