//! Tolerant deserializers for builder documents
//!
//! Documents come from a UI that stores whatever the user typed. Scalars of
//! the wrong JSON type are stringified rather than rejected.

use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;

fn scalar_to_string(value: &Json) -> Option<String> {
    match value {
        Json::Null => None,
        Json::String(s) => Some(s.clone()),
        Json::Bool(b) => Some(b.to_string()),
        Json::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Any JSON scalar as a string; `null` becomes `""`
pub fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Json::deserialize(deserializer)?;
    Ok(scalar_to_string(&value).unwrap_or_default())
}

/// Any JSON scalar as an optional string; `null` becomes `None`
pub fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Json::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

/// A list of strings, given either as an array or a comma-separated string
pub fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Json::deserialize(deserializer)?;
    Ok(match value {
        Json::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        Json::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        Json::Null => Vec::new(),
        other => scalar_to_string(&other).into_iter().collect(),
    })
}

/// A boolean, also accepting `"true"`/`"false"` strings and 0/1
pub fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Json::deserialize(deserializer)?;
    Ok(match value {
        Json::Bool(b) => b,
        Json::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Json::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}
