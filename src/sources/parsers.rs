use crate::error::ParseError;
use crate::model::{AgentId, Registry, RegistryEntry, SessionRecord};
use serde_json::{Map, Value};

/// Parse session listing JSON into typed records.
///
/// # Functional Core
/// Pure function - no I/O, just string parsing.
///
/// Accepted shapes:
/// - `[ {session}, ... ]`
/// - `{ "sessions": [ {session}, ... ] }`
/// - `{ "<key>": {session}, ... }` (the map key fills in a missing `key`)
///
/// Entries that are not JSON objects are skipped. Fields with unusable types
/// are dropped to their defaults rather than rejecting the entry.
pub fn parse_sessions(content: &str) -> Result<Vec<SessionRecord>, ParseError> {
    let root: Value =
        serde_json::from_str(content).map_err(|e| ParseError::Json(e.to_string()))?;

    match root {
        Value::Array(items) => Ok(sessions_from_items(&items)),
        Value::Object(map) => match map.get("sessions") {
            Some(Value::Array(items)) => Ok(sessions_from_items(items)),
            Some(_) => Err(ParseError::InvalidFormat(
                "`sessions` is not an array".to_string(),
            )),
            None => Ok(sessions_from_keyed_map(&map)),
        },
        other => Err(ParseError::InvalidFormat(format!(
            "expected session list, found {}",
            json_type(&other)
        ))),
    }
}

fn sessions_from_items(items: &[Value]) -> Vec<SessionRecord> {
    let sessions: Vec<SessionRecord> = items.iter().filter_map(session_from_value).collect();
    let skipped = items.len() - sessions.len();
    if skipped > 0 {
        tracing::warn!(skipped, "session entries that are not objects ignored");
    }
    sessions
}

fn sessions_from_keyed_map(map: &Map<String, Value>) -> Vec<SessionRecord> {
    map.iter()
        .filter_map(|(key, value)| {
            let mut record = session_from_value(value)?;
            if record.key.is_empty() {
                record.key = key.clone();
            }
            Some(record)
        })
        .collect()
}

/// Validate one raw session entry. Returns `None` for non-objects.
pub fn session_from_value(value: &Value) -> Option<SessionRecord> {
    let obj = value.as_object()?;

    Some(SessionRecord {
        key: text_field(obj, "key").unwrap_or_default(),
        age: text_field(obj, "age").unwrap_or_default(),
        tokens: text_field(obj, "tokens"),
        flags: obj.get("flags").filter(|v| !v.is_null()).cloned(),
        model: obj.get("model").and_then(Value::as_str).map(str::to_string),
        created_at: text_field(obj, "created_at"),
    })
}

/// String field, accepting numbers by their decimal rendering.
fn text_field(obj: &Map<String, Value>, name: &str) -> Option<String> {
    match obj.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse agent registry JSON.
///
/// # Functional Core
/// Pure function - no I/O, just string parsing.
///
/// Expects `{ "agents": [ ... ] }` (a bare array is accepted too). Entries
/// without a usable `id` are skipped.
pub fn parse_registry(content: &str) -> Result<Registry, ParseError> {
    let root: Value =
        serde_json::from_str(content).map_err(|e| ParseError::Json(e.to_string()))?;

    let items = match &root {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("agents") {
            Some(Value::Array(items)) => items,
            None => return Ok(Registry::new()),
            Some(_) => {
                return Err(ParseError::InvalidFormat(
                    "`agents` is not an array".to_string(),
                ))
            }
        },
        other => {
            return Err(ParseError::InvalidFormat(format!(
                "expected registry object, found {}",
                json_type(other)
            )))
        }
    };

    let mut skipped = 0usize;
    let entries: Vec<RegistryEntry> = items
        .iter()
        .filter_map(|item| {
            let entry = registry_entry_from_value(item);
            if entry.is_none() {
                skipped += 1;
            }
            entry
        })
        .collect();

    if skipped > 0 {
        tracing::warn!(skipped, "registry entries without id ignored");
    }

    Ok(Registry::from_entries(entries))
}

fn registry_entry_from_value(value: &Value) -> Option<RegistryEntry> {
    let obj = value.as_object()?;
    let id = obj.get("id").and_then(Value::as_str).and_then(AgentId::parse)?;

    let string = |name: &str| obj.get(name).and_then(Value::as_str).map(str::to_string);

    Some(RegistryEntry {
        id,
        name: string("name"),
        specialization: string("specialization").unwrap_or_default(),
        current_status: string("current_status"),
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_array() {
        let sessions = parse_sessions(
            r#"[{"key": "agent:main:main", "age": "2 minutes", "tokens": "12k/200k", "model": "opus"}]"#,
        )
        .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].key, "agent:main:main");
        assert_eq!(sessions[0].tokens.as_deref(), Some("12k/200k"));
        assert_eq!(sessions[0].model.as_deref(), Some("opus"));
    }

    #[test]
    fn keyed_map_fills_missing_key() {
        let sessions =
            parse_sessions(r#"{"subagent:a:design": {"age": "5 minutes"}}"#).unwrap();
        assert_eq!(sessions[0].key, "subagent:a:design");
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let sessions = parse_sessions(r#"[1, "x", null, {"key": "k"}]"#).unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn odd_field_types_fall_back() {
        let sessions =
            parse_sessions(r#"[{"key": 42, "age": ["3 hours"], "tokens": 5000, "flags": null}]"#)
                .unwrap();
        let s = &sessions[0];
        assert_eq!(s.key, "42");
        assert_eq!(s.age, "");
        assert_eq!(s.tokens.as_deref(), Some("5000"));
        assert!(s.flags.is_none());
    }

    #[test]
    fn scalar_root_is_an_error() {
        assert!(parse_sessions("3").is_err());
        assert!(parse_sessions("not json").is_err());
    }

    #[test]
    fn registry_skips_entries_without_id() {
        let registry = parse_registry(
            r#"{"agents": [{"id": "designer", "name": "Designer"}, {"name": "ghost"}, {"id": ""}]}"#,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].display_name(), "Designer");
    }

    #[test]
    fn registry_without_agents_key_is_empty() {
        assert!(parse_registry("{}").unwrap().is_empty());
        assert!(parse_registry(r#"{"agents": 3}"#).is_err());
    }
}
