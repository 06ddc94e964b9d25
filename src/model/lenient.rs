//! Tolerant decoding helpers.
//!
//! Stored documents come from older releases, other tools and hand edits. A
//! single bad value must cost only that value: scalars fall back to their
//! default, list elements are dropped one at a time and objects are merged
//! key by key over their defaults. Every fallback is logged with `warn!`.

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `deserialize_with` target: `null` or an ill-typed value becomes `T::default()`.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_or_default(value))
}

/// `deserialize_with` target for lists: elements that fail to decode are
/// dropped, a non-list value yields an empty list.
pub fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_seq(value, "list"))
}

pub fn decode_or_default<T: DeserializeOwned + Default>(value: Value) -> T {
    decode_or(value, T::default)
}

/// Decode `value`, or use `fallback` when it is `null` or ill-typed.
pub fn decode_or<T: DeserializeOwned>(value: Value, fallback: impl FnOnce() -> T) -> T {
    if value.is_null() {
        return fallback();
    }
    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Ignoring malformed value: {}", e);
        fallback()
    })
}

/// Decode each element on its own, skipping the ones that do not fit.
pub fn decode_seq<T: DeserializeOwned>(value: Value, what: &str) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Dropping malformed {} element {}: {}", what, index, e);
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            warn!("Expected a list for {}, found {}", what, json_kind(&other));
            Vec::new()
        }
    }
}

/// Merge an object over `T::default()` one key at a time.
///
/// A key whose value is `null` or does not decode keeps its default; the
/// remaining keys still apply. Unknown keys are left to `T`'s own decoding.
pub fn overlay<T>(value: Value, what: &str) -> T
where
    T: Serialize + DeserializeOwned + Default,
{
    let stored = match value {
        Value::Object(stored) => stored,
        Value::Null => return T::default(),
        other => {
            warn!("Expected an object for {}, found {}", what, json_kind(&other));
            return T::default();
        }
    };

    let mut merged = match serde_json::to_value(T::default()) {
        Ok(Value::Object(base)) => base,
        _ => Map::new(),
    };

    for (key, item) in stored {
        if item.is_null() {
            continue;
        }
        let previous = merged.insert(key.clone(), item);
        if let Err(e) = serde_json::from_value::<T>(Value::Object(merged.clone())) {
            warn!("Ignoring malformed {} key '{}': {}", what, key, e);
            match previous {
                Some(previous) => merged.insert(key, previous),
                None => merged.remove(&key),
            };
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or_else(|e| {
        warn!("Could not decode {}, using defaults: {}", what, e);
        T::default()
    })
}

/// Take one field out of the object, falling back to `None` when it is
/// missing, `null` or of the wrong shape.
pub(crate) fn take_field<T: DeserializeOwned>(obj: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = obj.remove(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Ignoring malformed field '{}': {}", key, e);
            None
        }
    }
}

pub(crate) fn take_seq<T: DeserializeOwned>(obj: &mut Map<String, Value>, key: &str) -> Vec<T> {
    obj.remove(key)
        .map(|value| decode_seq(value, key))
        .unwrap_or_default()
}

pub(crate) fn take_overlay<T>(obj: &mut Map<String, Value>, key: &str) -> T
where
    T: Serialize + DeserializeOwned + Default,
{
    obj.remove(key)
        .map(|value| overlay(value, key))
        .unwrap_or_default()
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
