use serde_json::Value;

/// Produce canonical JSON bytes: object keys sorted lexicographically (recursive),
/// arrays preserve order, no extra whitespace.
///
/// Callers that need set semantics for an array must sort it before handing
/// the value over; this function never reorders array elements.
pub fn canonical_json_bytes(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&sort_value(value))
}

fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<(&String, &Value)> = map.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_value(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}

/// Sort and de-duplicate a list of strings into a JSON array.
pub fn sorted_string_set<I, S>(items: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    out.sort();
    out.dedup();
    Value::Array(out.into_iter().map(Value::String).collect())
}
