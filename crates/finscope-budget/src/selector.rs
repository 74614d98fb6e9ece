use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("tag selector {0:?} must have the form key:value or key:*")]
    MissingSeparator(String),
    #[error("tag selector {0:?} has an empty key")]
    EmptyKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorValue {
    Exact(String),
    Any,
}

/// A parsed `key:value` or `key:*` tag selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelector {
    pub key: String,
    pub value: SelectorValue,
}

impl TagSelector {
    /// Split on the first `:`. A value of `*` matches any value for the key.
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        let (key, value) = raw
            .split_once(':')
            .ok_or_else(|| SelectorError::MissingSeparator(raw.to_string()))?;
        if key.is_empty() {
            return Err(SelectorError::EmptyKey(raw.to_string()));
        }
        let value = match value {
            "*" => SelectorValue::Any,
            v => SelectorValue::Exact(v.to_string()),
        };
        Ok(Self {
            key: key.to_string(),
            value,
        })
    }

    pub fn matches(&self, tags: &BTreeMap<String, String>) -> bool {
        match (&self.value, tags.get(&self.key)) {
            (SelectorValue::Any, Some(_)) => true,
            (SelectorValue::Exact(want), Some(got)) => want == got,
            (_, None) => false,
        }
    }
}

impl fmt::Display for TagSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            SelectorValue::Any => write!(f, "{}:*", self.key),
            SelectorValue::Exact(v) => write!(f, "{}:{}", self.key, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn exact_selector_matches_only_that_pair() {
        let sel = TagSelector::parse("team:platform").unwrap();
        assert!(sel.matches(&tags(&[("team", "platform")])));
        assert!(!sel.matches(&tags(&[("team", "backend")])));
        assert!(!sel.matches(&tags(&[("owner", "platform")])));
    }

    #[test]
    fn wildcard_matches_any_value() {
        let sel = TagSelector::parse("env:*").unwrap();
        assert_eq!(sel.value, SelectorValue::Any);
        assert!(sel.matches(&tags(&[("env", "prod")])));
        assert!(sel.matches(&tags(&[("env", "")])));
        assert!(!sel.matches(&tags(&[])));
    }

    #[test]
    fn value_may_contain_colons() {
        let sel = TagSelector::parse("arn:aws:iam::123").unwrap();
        assert_eq!(sel.key, "arn");
        assert_eq!(sel.value, SelectorValue::Exact("aws:iam::123".into()));
        assert_eq!(sel.to_string(), "arn:aws:iam::123");
    }

    #[test]
    fn malformed_selectors_are_rejected() {
        assert_eq!(
            TagSelector::parse("team"),
            Err(SelectorError::MissingSeparator("team".into()))
        );
        assert_eq!(
            TagSelector::parse(":platform"),
            Err(SelectorError::EmptyKey(":platform".into()))
        );
    }
}
