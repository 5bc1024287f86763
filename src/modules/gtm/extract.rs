use crate::error::{AppError, AppResult};
use crate::models::GtmEventConfig;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

/// GTM tag type of a "Google Analytics: GA4 Event" tag.
pub const GA4_EVENT_TAG_TYPE: &str = "gaawe";

static TAG_NAME_EVENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^GA4\s*-\s*(?:Basic Event|Ecommerce)\s*-\s*(.+)$")
        .expect("tag name pattern is valid")
});

/// (list key on the tag, name field inside each entry)
const PARAMETER_ENCODINGS: [(&str, &str); 3] = [
    ("eventParameters", "name"),
    ("eventSettingsTable", "parameter"),
    ("userProperties", "name"),
];

pub fn is_variable_reference(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.starts_with("{{") && trimmed.ends_with("}}")
}

/// Parses a raw export string. Only unparseable JSON is an error; an export
/// without GA4 event tags yields an empty list.
pub fn parse_export(raw: &str) -> AppResult<Vec<GtmEventConfig>> {
    let export: Value = serde_json::from_str(raw).map_err(|e| {
        AppError::MalformedExportInput(format!("GTM export is not valid JSON: {}", e))
    })?;
    Ok(extract_events(&export))
}

/// Reduces every GA4 event tag in `export` to its event name and parameter names.
///
/// Accepts a full container export (`containerVersion.tag`), a bare
/// container version (`tag`) or the tag array itself.
pub fn extract_events(export: &Value) -> Vec<GtmEventConfig> {
    let tags = container_tags(export);
    let mut events = Vec::new();

    for tag in tags
        .iter()
        .filter(|tag| tag.get("type").and_then(Value::as_str) == Some(GA4_EVENT_TAG_TYPE))
    {
        let tag_name = tag.get("name").and_then(Value::as_str).unwrap_or_default();
        let tag_id = tag
            .get("tagId")
            .map(|id| match id {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();

        let Some(event_name) = resolve_event_name(tag) else {
            tracing::warn!(
                tag_id = %tag_id,
                tag_name = %tag_name,
                "Skipping GA4 event tag: event name is a variable and the tag name does not follow 'GA4 - <Basic Event|Ecommerce> - <Name>'"
            );
            continue;
        };

        let parameters = collect_parameters(tag);
        if parameters.is_empty() {
            tracing::debug!(tag_id = %tag_id, event = %event_name, "GA4 event tag has no static parameters");
            continue;
        }
        events.push(GtmEventConfig::new(event_name, parameters));
    }

    events
}

fn container_tags(export: &Value) -> &[Value] {
    let tags = match export {
        Value::Array(_) => Some(export),
        Value::Object(_) => export
            .pointer("/containerVersion/tag")
            .or_else(|| export.get("tag")),
        _ => None,
    };
    tags.and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Looks up a tag parameter either in GTM's `[{key, value|list}]` form or
/// as a plain object field.
fn tag_parameter<'a>(tag: &'a Value, key: &str) -> Option<&'a Value> {
    match tag.get("parameter") {
        Some(Value::Array(items)) => items
            .iter()
            .find(|p| p.get("key").and_then(Value::as_str) == Some(key))
            .and_then(|p| p.get("list").or_else(|| p.get("value"))),
        Some(Value::Object(map)) => map.get(key),
        _ => tag.get(key),
    }
}

/// Reads `field` from a list entry encoded as a GTM MAP or a flat object.
fn entry_field<'a>(entry: &'a Value, field: &str) -> Option<&'a str> {
    match entry.get("map").and_then(Value::as_array) {
        Some(map) => map
            .iter()
            .find(|kv| kv.get("key").and_then(Value::as_str) == Some(field))
            .and_then(|kv| kv.get("value"))
            .and_then(Value::as_str),
        None => entry.get(field).and_then(Value::as_str),
    }
}

fn resolve_event_name(tag: &Value) -> Option<String> {
    let raw = tag_parameter(tag, "eventName")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if !raw.is_empty() && !is_variable_reference(raw) {
        return Some(raw.to_string());
    }
    if raw.is_empty() {
        return None;
    }

    let tag_name = tag.get("name").and_then(Value::as_str)?;
    event_name_from_tag_name(tag_name)
}

/// "GA4 - Basic Event - Add To Cart" -> "add_to_cart"
pub fn event_name_from_tag_name(tag_name: &str) -> Option<String> {
    let captured = TAG_NAME_EVENT.captures(tag_name.trim())?.get(1)?.as_str();
    let name = captured
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    (!name.is_empty()).then_some(name)
}

fn collect_parameters(tag: &Value) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut parameters = Vec::new();

    for (list_key, name_field) in PARAMETER_ENCODINGS {
        let Some(entries) = tag_parameter(tag, list_key).and_then(Value::as_array) else {
            continue;
        };
        for entry in entries {
            let Some(name) = entry_field(entry, name_field).map(str::trim) else {
                continue;
            };
            if name.is_empty() || is_variable_reference(name) {
                continue;
            }
            if seen.insert(name.to_string()) {
                parameters.push(name.to_string());
            }
        }
    }

    parameters
}
