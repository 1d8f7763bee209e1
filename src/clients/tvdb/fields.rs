//! Loose field access over TVDB JSON payloads.
//!
//! TVDB returns the same logical field under different keys and types
//! depending on endpoint and API tier, so lookups take a priority-ordered key
//! list and coerce whatever they find.

use serde_json::{Map, Value};

pub type Item = Map<String, Value>;

const ENGLISH: [&str; 3] = ["eng", "en", "english"];
const NESTED_TEXT: [&str; 4] = ["value", "id", "name", "title"];

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// First usable string under any of `keys`.
///
/// Accepts plain strings, positive numbers, language maps (`eng`/`en`/
/// `english`), nested `value`/`id`/`name`/`title` objects and arrays of
/// `{language, name}` translations.
#[must_use]
pub fn first_string(item: &Item, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find_map(coerce_string)
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                (i > 0).then(|| i.to_string())
            } else {
                n.as_f64().filter(|f| *f > 0.0).map(|f| f.trunc().to_string())
            }
        }
        Value::Object(map) => ENGLISH
            .iter()
            .chain(NESTED_TEXT.iter())
            .filter_map(|key| map.get(*key))
            .find_map(|nested| nested.as_str().and_then(non_empty)),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .filter(|entry| {
                first_string(entry, &["language", "lang", "locale"])
                    .is_some_and(|lang| ENGLISH.contains(&lang.to_lowercase().as_str()))
            })
            .find_map(|entry| first_string(entry, &["name", "title", "value", "text"])),
        Value::Bool(_) | Value::Null => None,
    }
}

/// First integer under any of `keys`, accepting numbers and numeric strings.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn first_int(item: &Item, keys: &[&str]) -> Option<i64> {
    keys.iter().filter_map(|key| item.get(*key)).find_map(|value| match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// First float under any of `keys`, accepting numbers and numeric strings.
#[must_use]
pub fn first_f64(item: &Item, keys: &[&str]) -> Option<f64> {
    keys.iter().filter_map(|key| item.get(*key)).find_map(|value| match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Objects of the array stored under `key`.
#[must_use]
pub fn object_array<'a>(item: &'a Item, key: &str) -> Vec<&'a Item> {
    item.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

fn objects_of(items: &[Value]) -> Vec<Item> {
    items
        .iter()
        .filter_map(Value::as_object)
        .cloned()
        .collect()
}

const ARRAY_KEYS: [&str; 5] = ["series", "episodes", "results", "items", "hits"];

/// List payload of a TVDB response.
///
/// Tries `data` as an array, then the known nested keys under `data`, and
/// only then a depth-first search for the first non-empty array of objects.
#[must_use]
pub fn decode_array_data(payload: &Value) -> Vec<Item> {
    match payload.get("data") {
        Some(Value::Array(items)) => return objects_of(items),
        Some(data @ Value::Object(map)) => {
            if let Some(items) = ARRAY_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array))
            {
                return objects_of(items);
            }
            if let Some(items) = find_first_object_array(data) {
                return items;
            }
        }
        _ => {}
    }

    find_first_object_array(payload).unwrap_or_default()
}

fn find_first_object_array(value: &Value) -> Option<Vec<Item>> {
    match value {
        Value::Array(items) => {
            let objects = objects_of(items);
            if !objects.is_empty() {
                return Some(objects);
            }
            items.iter().find_map(find_first_object_array)
        }
        Value::Object(map) => map.values().find_map(find_first_object_array),
        _ => None,
    }
}

/// Object payload under `data`; `None` when absent or empty.
#[must_use]
pub fn decode_object_data(payload: &Value) -> Option<Item> {
    payload
        .get("data")
        .and_then(Value::as_object)
        .filter(|data| !data.is_empty())
        .cloned()
}

/// Bearer token from a login response (`token` or `data.token`).
#[must_use]
pub fn extract_token(payload: &Value) -> Option<String> {
    let root = payload.as_object()?;
    first_string(root, &["token"]).or_else(|| {
        root.get("data")
            .and_then(Value::as_object)
            .and_then(|data| first_string(data, &["token"]))
    })
}
