pub mod config;
pub mod evaluator;
pub mod health;
pub mod scope;
pub mod selector;
pub mod types;

pub use config::{BudgetsConfig, ScopedBudget, TagBudget};
pub use evaluator::{extract_provider, BudgetEvaluation, ScopedBudgetEvaluator, TagSelection};
pub use health::{
    aggregate_health_statuses, calculate_health_from_percentage, calculate_overall_health,
    identify_critical_scopes, BudgetHealth,
};
pub use scope::{ScopeId, ScopeType};
pub use selector::{SelectorError, SelectorValue, TagSelector};
pub use types::{BudgetAllocation, CostLineItem, ScopedBudgetResult, ScopedBudgetStatus};
