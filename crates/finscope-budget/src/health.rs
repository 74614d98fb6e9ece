//! Budget health states and their aggregation.

use crate::scope::ScopeId;
use crate::types::ScopedBudgetResult;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const WARNING_THRESHOLD: f64 = 80.0;
pub const CRITICAL_THRESHOLD: f64 = 90.0;
pub const EXCEEDED_THRESHOLD: f64 = 100.0;

/// How close a scope's spend is to its limit.
///
/// Variants are declared in severity order, so `Ord` gives
/// `Unspecified < Ok < Warning < Critical < Exceeded`.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetHealth {
    /// Nothing to aggregate.
    #[default]
    Unspecified,
    Ok,
    Warning,
    Critical,
    Exceeded,
}

impl BudgetHealth {
    pub fn is_critical(self) -> bool {
        matches!(self, BudgetHealth::Critical | BudgetHealth::Exceeded)
    }
}

impl fmt::Display for BudgetHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetHealth::Unspecified => write!(f, "UNSPECIFIED"),
            BudgetHealth::Ok => write!(f, "OK"),
            BudgetHealth::Warning => write!(f, "WARNING"),
            BudgetHealth::Critical => write!(f, "CRITICAL"),
            BudgetHealth::Exceeded => write!(f, "EXCEEDED"),
        }
    }
}

/// Map a spend percentage to a health state. Lower bounds are inclusive;
/// negative (and NaN) percentages are OK.
pub fn calculate_health_from_percentage(pct: f64) -> BudgetHealth {
    if pct >= EXCEEDED_THRESHOLD {
        BudgetHealth::Exceeded
    } else if pct >= CRITICAL_THRESHOLD {
        BudgetHealth::Critical
    } else if pct >= WARNING_THRESHOLD {
        BudgetHealth::Warning
    } else {
        BudgetHealth::Ok
    }
}

/// The most severe state present; `Unspecified` for an empty input.
pub fn aggregate_health_statuses<I>(statuses: I) -> BudgetHealth
where
    I: IntoIterator<Item = BudgetHealth>,
{
    statuses.into_iter().max().unwrap_or(BudgetHealth::Unspecified)
}

pub fn calculate_overall_health(result: &ScopedBudgetResult) -> BudgetHealth {
    aggregate_health_statuses(result.statuses().map(|s| s.health))
}

/// Scopes whose own health is CRITICAL or EXCEEDED, in result order.
pub fn identify_critical_scopes(result: &ScopedBudgetResult) -> Vec<ScopeId> {
    result
        .statuses()
        .filter(|s| s.health.is_critical())
        .map(|s| s.scope_id())
        .collect()
}
