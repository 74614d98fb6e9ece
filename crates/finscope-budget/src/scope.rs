use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dimension of the budget hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    Global,
    Provider,
    Tag,
    Type,
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeType::Global => write!(f, "global"),
            ScopeType::Provider => write!(f, "provider"),
            ScopeType::Tag => write!(f, "tag"),
            ScopeType::Type => write!(f, "type"),
        }
    }
}

/// One scope a cost can be counted against.
///
/// Renders as `global`, `provider:<name>`, `tag:<selector>` or
/// `type:<resourceType>`, and parses back from the same form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ScopeId {
    Global,
    Provider(String),
    Tag(String),
    Type(String),
}

impl ScopeId {
    pub fn scope_type(&self) -> ScopeType {
        match self {
            ScopeId::Global => ScopeType::Global,
            ScopeId::Provider(_) => ScopeType::Provider,
            ScopeId::Tag(_) => ScopeType::Tag,
            ScopeId::Type(_) => ScopeType::Type,
        }
    }

    /// Identifying key within the scope type. Empty for global.
    pub fn key(&self) -> &str {
        match self {
            ScopeId::Global => "",
            ScopeId::Provider(k) | ScopeId::Tag(k) | ScopeId::Type(k) => k,
        }
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeId::Global => write!(f, "global"),
            other => write!(f, "{}:{}", other.scope_type(), other.key()),
        }
    }
}

impl FromStr for ScopeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "global" {
            return Ok(ScopeId::Global);
        }
        let (kind, key) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid scope id: {s}"))?;
        match kind {
            "provider" => Ok(ScopeId::Provider(key.to_string())),
            "tag" => Ok(ScopeId::Tag(key.to_string())),
            "type" => Ok(ScopeId::Type(key.to_string())),
            _ => Err(format!(
                "invalid scope id: {s}. Expected: global, provider:<name>, tag:<selector>, type:<resource type>"
            )),
        }
    }
}

impl From<ScopeId> for String {
    fn from(id: ScopeId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ScopeId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
