use anyhow::Context;
use finscope_budget::BudgetsConfig;
use finscope_store::CacheConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine settings: cache behaviour plus the budget hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budgets: Option<BudgetsConfig>,
}

impl EngineConfig {
    pub fn from_yaml_str(s: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(s).context("invalid YAML engine config")
    }

    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("invalid JSON engine config")
    }

    /// Read a config file. `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        };
        parsed.with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
cache:
  dir: /tmp/finscope-test-cache
  ttl_seconds: 600
budgets:
  global:
    amount: 10000
    currency: USD
  providers:
    aws:
      amount: 5000
  tags:
    - selector: "team:platform"
      priority: 100
      amount: 2000
    - selector: "env:*"
      priority: 10
      amount: 800
  types:
    "aws:ec2/instance":
      amount: 1000
"#;

    #[test]
    fn parses_yaml() {
        let cfg = EngineConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(cfg.cache.ttl_seconds, 600);
        assert!(cfg.cache.enabled);
        let budgets = cfg.budgets.unwrap();
        assert_eq!(budgets.global.unwrap().amount, 10000.0);
        assert_eq!(budgets.providers["aws"].currency, "USD");
        assert_eq!(budgets.tags.len(), 2);
        assert_eq!(budgets.tags[1].selector, "env:*");
        assert_eq!(budgets.types["aws:ec2/instance"].amount, 1000.0);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = EngineConfig::from_json_str("{}").unwrap();
        assert!(cfg.budgets.is_none());
        assert_eq!(cfg.cache, CacheConfig::default());
    }

    #[test]
    fn load_dispatches_on_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let json_path = tmp.path().join("finscope.json");
        std::fs::write(&json_path, r#"{"cache":{"enabled":false}}"#).unwrap();
        assert!(!EngineConfig::load(&json_path).unwrap().cache.enabled);

        let yaml_path = tmp.path().join("finscope.yaml");
        std::fs::write(&yaml_path, SAMPLE).unwrap();
        assert!(EngineConfig::load(&yaml_path).unwrap().budgets.is_some());
    }

    #[test]
    fn load_reports_path_on_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = EngineConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }
}
