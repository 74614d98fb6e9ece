//! Cache key generation for cost queries.
//!
//! A [`QueryKeyParams`] describes one request to the cost engine. Two
//! parameter sets that only differ in the casing of operation, provider or
//! sort order, or in the order resource types and filters were supplied,
//! produce the same key.

use crate::canon::{canonical_json_bytes, sorted_string_set};
use crate::hash::{content_id, content_id_of_fields};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to serialize canonical key form: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Paging block of a query. Only part of the key when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
    #[serde(default)]
    pub sort_by: String,
    #[serde(default)]
    pub sort_order: String,
}

/// Structured description of a cost query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryKeyParams {
    pub operation: String,
    pub provider: String,
    #[serde(default)]
    pub resource_types: Vec<String>,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl QueryKeyParams {
    /// Canonical JSON value for these params.
    pub fn canonical_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(
            "operation".into(),
            Value::String(self.operation.to_lowercase()),
        );
        obj.insert(
            "provider".into(),
            Value::String(self.provider.to_lowercase()),
        );
        obj.insert(
            "resource_types".into(),
            sorted_string_set(&self.resource_types),
        );
        obj.insert(
            "filters".into(),
            Value::Object(
                self.filters
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        );
        if let Some(p) = &self.pagination {
            obj.insert(
                "pagination".into(),
                serde_json::json!({
                    "limit": p.limit,
                    "offset": p.offset,
                    "sort_by": p.sort_by,
                    "sort_order": p.sort_order.to_lowercase(),
                }),
            );
        }
        Value::Object(obj)
    }

    /// Canonical byte form fed to the digest.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, KeyError> {
        Ok(canonical_json_bytes(&self.canonical_value())?)
    }
}

/// Generate the cache key for a structured query.
pub fn generate_key(params: &QueryKeyParams) -> Result<String, KeyError> {
    Ok(content_id(&params.canonical_bytes()?))
}

/// Generate a key from positional fields.
///
/// Fields are hashed in call order without normalization: callers must pass
/// `extra` in a stable order.
pub fn generate_simple_key(operation: &str, provider: &str, extra: &[&str]) -> String {
    content_id_of_fields(
        [operation, provider]
            .into_iter()
            .chain(extra.iter().copied()),
    )
}

/// Hash a raw query string verbatim. Whitespace and case are significant.
pub fn generate_key_from_query(query: &str) -> String {
    content_id(query.as_bytes())
}
