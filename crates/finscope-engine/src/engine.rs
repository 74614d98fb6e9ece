//! Request execution: canonical key, cache probe, then source and budget
//! evaluation on a miss.
//!
//! The cache is a pure optimization. Every cache failure is logged and
//! handled as a miss; only the cost source can fail a request.

use crate::config::EngineConfig;
use crate::source::CostSource;
use finscope_budget::{
    identify_critical_scopes, BudgetEvaluation, BudgetsConfig, CostLineItem, ScopeId,
    ScopedBudgetEvaluator,
};
use finscope_core::{generate_key, QueryKeyParams};
use finscope_store::{CacheError, FileCache};
use serde::{Deserialize, Serialize};

/// Combined result for one request; this is what gets cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub key: String,
    pub items: Vec<CostLineItem>,
    pub evaluation: BudgetEvaluation,
    #[serde(default)]
    pub critical_scopes: Vec<ScopeId>,
}

impl CostReport {
    pub fn total_cost(&self) -> f64 {
        self.items.iter().map(|i| i.monthly_cost).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineResponse {
    pub report: CostReport,
    pub cache_hit: bool,
}

pub struct CostEngine<S> {
    cache: FileCache,
    budgets: Option<BudgetsConfig>,
    source: S,
}

impl<S: CostSource> CostEngine<S> {
    pub fn new(cache: FileCache, budgets: Option<BudgetsConfig>, source: S) -> Self {
        Self {
            cache,
            budgets,
            source,
        }
    }

    /// Build an engine from settings. If the cache directory cannot be
    /// opened the engine runs with a disabled cache instead.
    pub fn from_config(config: &EngineConfig, source: S) -> Self {
        let settings = &config.cache;
        let cache = FileCache::from_config(settings).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "cache unavailable; continuing without it");
            FileCache::disabled(&settings.dir, settings.ttl_seconds, settings.max_size_mb)
        });
        Self::new(cache, config.budgets.clone(), source)
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    pub fn budgets(&self) -> Option<&BudgetsConfig> {
        self.budgets.as_ref()
    }

    /// Serve a request from cache, or compute and store it.
    pub fn run(&self, request: &QueryKeyParams) -> anyhow::Result<EngineResponse> {
        let key = generate_key(request)?;

        if let Some(report) = self.lookup(&key) {
            return Ok(EngineResponse {
                report,
                cache_hit: true,
            });
        }

        let items = self.source.fetch_costs(request)?;
        let report = self.build_report(key, items);
        self.store(&report);
        Ok(EngineResponse {
            report,
            cache_hit: false,
        })
    }

    /// Evaluate budgets for items without touching the cache.
    pub fn evaluate(&self, items: &[CostLineItem]) -> BudgetEvaluation {
        ScopedBudgetEvaluator::new(self.budgets.as_ref()).evaluate(items)
    }

    fn build_report(&self, key: String, items: Vec<CostLineItem>) -> CostReport {
        let evaluation = self.evaluate(&items);
        let critical_scopes = identify_critical_scopes(&evaluation.result);
        CostReport {
            key,
            items,
            evaluation,
            critical_scopes,
        }
    }

    fn lookup(&self, key: &str) -> Option<CostReport> {
        let bytes = match self.cache.get(key) {
            Ok(bytes) => bytes,
            Err(e) if e.is_miss() => {
                tracing::debug!(key, reason = %e, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed; treating as miss");
                return None;
            }
        };
        match serde_json::from_slice::<CostReport>(&bytes) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!(key, error = %e, "cached report is unreadable; recomputing");
                None
            }
        }
    }

    fn store(&self, report: &CostReport) {
        let bytes = match serde_json::to_vec(report) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(key = %report.key, error = %e, "cannot encode report for cache");
                return;
            }
        };
        match self.cache.set(&report.key, &bytes) {
            Ok(()) | Err(CacheError::Disabled) => {}
            Err(e) => tracing::warn!(key = %report.key, error = %e, "cache write failed"),
        }
    }
}
