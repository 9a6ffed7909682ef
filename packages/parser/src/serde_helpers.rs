//! Lenient deserializers for upstream documents.
//!
//! Configuration documents are hand-edited and partially written by other
//! tools, so a wrongly-typed field falls back to its default instead of
//! failing the whole node.

use crate::raw::{RawRule, RawTopic};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// `null`, `false`, `0` and `""` count as "no entry"
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).unwrap_or_default())
}

pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value))
}

pub fn boolean<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    })
}

/// Whole sub-objects that cannot be read fall back to `Default`
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "Replacing unreadable section with defaults");
        T::default()
    }))
}

/// Term lists keep their string entries and drop everything else
pub fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Rule arrays: falsy entries become `None`, unreadable entries are
/// logged and become `None`, a non-array becomes an empty list.
pub fn nodes<'de, D>(deserializer: D) -> Result<Vec<Option<RawRule>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(nodes_from_value(value))
}

pub fn opt_nodes<'de, D>(deserializer: D) -> Result<Option<Vec<Option<RawRule>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(_) => Some(nodes_from_value(value)),
        _ => None,
    })
}

fn nodes_from_value(value: Value) -> Vec<Option<RawRule>> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if is_falsy(&item) || !item.is_object() {
                return None;
            }
            match RawRule::deserialize(item) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable rule entry");
                    None
                }
            }
        })
        .collect()
}

/// Topic slot: anything but an array means "no topic data"
pub fn topics<'de, D>(deserializer: D) -> Result<Option<Vec<RawTopic>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(None);
    };

    Ok(Some(
        items
            .into_iter()
            .filter(|item| item.is_object())
            .filter_map(|item| RawTopic::deserialize(item).ok())
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_values() {
        assert!(is_falsy(&json!(null)));
        assert!(is_falsy(&json!(false)));
        assert!(is_falsy(&json!(0)));
        assert!(is_falsy(&json!("")));
        assert!(!is_falsy(&json!({})));
        assert!(!is_falsy(&json!([])));
        assert!(!is_falsy(&json!("x")));
    }

    #[test]
    fn test_nodes_skip_falsy_and_scalars() {
        let parsed = nodes_from_value(json!([null, {"name": "A"}, false, 3, {"name": "B"}]));
        assert_eq!(parsed.len(), 5);

        let names: Vec<_> = parsed.iter().flatten().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
