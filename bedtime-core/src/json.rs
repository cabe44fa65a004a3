//! Best-effort JSON extraction from model replies.
//!
//! Models asked for "ONLY valid JSON" still wrap it in markdown fences or
//! chat around it. These helpers find the object and read fields without
//! insisting on exact types.

use serde_json::{Map, Value};

/// Body of the first markdown code block, minus its language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let (_, rest) = text.split_once("```")?;
    let body = match rest.split_once('\n') {
        Some((tag, body)) if !tag.contains("```") => body,
        _ => rest,
    };
    let (block, _) = body.split_once("```")?;
    Some(block.trim())
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// The first `{` from which a whole object parses; trailing text is ignored.
fn scan_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<Map<String, Value>>()
            .next()?
            .ok()
    })
}

/// Find the first JSON object in `text`.
///
/// Prefers a fenced code block, then the bare reply, then the first object
/// embedded in prose.
pub(crate) fn find_object(text: &str) -> Option<Map<String, Value>> {
    let text = text.trim();
    fenced_block(text)
        .and_then(|block| parse_object(block).or_else(|| scan_object(block)))
        .or_else(|| parse_object(text))
        .or_else(|| scan_object(text))
}

/// A non-empty trimmed string field.
pub(crate) fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// A list of strings; a single string is read as a one-item list.
pub(crate) fn string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    let items = match map.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(as_text).collect(),
        Some(value) => as_text(value).into_iter().collect(),
        None => Vec::new(),
    };
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Booleans, plus the strings models tend to use for them.
pub(crate) fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "pass" | "passed" => Some(true),
            "false" | "no" | "fail" | "failed" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Numbers, plus numeric strings.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Names in a list; objects contribute `name` plus a short descriptor.
pub(crate) fn name_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(as_name).collect(),
        Some(value) => as_name(value).into_iter().collect(),
        None => Vec::new(),
    }
}

fn as_name(value: &Value) -> Option<String> {
    if let Value::Object(item) = value {
        if let Some(name) = string_field(item, "name") {
            let descriptor = ["species", "kind", "type", "role"]
                .iter()
                .find_map(|key| string_field(item, key));
            return Some(match descriptor {
                Some(descriptor) => format!("{name} ({descriptor})"),
                None => name,
            });
        }
    }
    as_text(value)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Text of a list item; objects contribute their `description` or `text`.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => ["description", "text", "beat", "name"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}
