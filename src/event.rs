//! Events received from a feed

use chrono::{DateTime, FixedOffset};
use eyre::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Event type carrying a log record payload
pub const LOGGING_EVENT_TYPE: &str = "logging";

/// A single event as delivered by a feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: DateTime<FixedOffset>,
    /// Type-specific payload
    #[serde(rename = "metadata", default)]
    pub payload: Value,
    /// Node the event originated from (multi-node deployments only)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project: String,
}

impl Event {
    pub fn is_logging(&self) -> bool {
        self.event_type == LOGGING_EVENT_TYPE
    }

    /// Decode the payload of a `logging` event
    pub fn to_log_record(&self) -> Result<LogRecord> {
        if !self.is_logging() {
            eyre::bail!("Event is not a log record (type: {})", self.event_type);
        }
        LogRecord::deserialize(&self.payload).context("Failed to decode log record")
    }
}

/// Decoded payload of a `logging` event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogRecord {
    #[serde(alias = "lvl")]
    pub level: String,
    #[serde(default, alias = "t")]
    pub time: Option<DateTime<FixedOffset>>,
    #[serde(alias = "msg")]
    pub message: String,
    /// Alternating key/value tokens
    #[serde(default, alias = "ctx", deserialize_with = "deserialize_context")]
    pub context: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContextTokens {
    Tokens(Vec<Value>),
    Fields(serde_json::Map<String, Value>),
}

/// Accept context either as a flat token list or as an object of fields
fn deserialize_context<'de, D>(deserializer: D) -> std::result::Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let tokens = match Option::<ContextTokens>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(ContextTokens::Tokens(tokens)) => tokens,
        Some(ContextTokens::Fields(fields)) => fields
            .into_iter()
            .flat_map(|(key, value)| [Value::String(key), value])
            .collect(),
    };
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn logging_event(payload: Value) -> Event {
        Event {
            event_type: LOGGING_EVENT_TYPE.to_string(),
            timestamp: DateTime::parse_from_rfc3339("2026-01-03T12:00:00Z").unwrap(),
            payload,
            location: "node1".to_string(),
            project: String::new(),
        }
    }

    #[test]
    fn test_event_wire_format() {
        let line = r#"{"type":"lifecycle","timestamp":"2026-01-03T12:00:00Z","metadata":{"action":"instance-started"},"location":"node2","project":"default"}"#;
        let event: Event = serde_json::from_str(line).unwrap();
        assert_eq!(event.event_type, "lifecycle");
        assert_eq!(event.location, "node2");
        assert_eq!(event.project, "default");
        assert_eq!(event.payload["action"], "instance-started");
    }

    #[test]
    fn test_event_optional_fields() {
        let line = r#"{"type":"operation","timestamp":"2026-01-03T12:00:00+02:00"}"#;
        let event: Event = serde_json::from_str(line).unwrap();
        assert!(event.location.is_empty());
        assert!(event.payload.is_null());

        let back = serde_json::to_value(&event).unwrap();
        assert!(back.get("location").is_none());
        assert!(back.get("metadata").is_some());
    }

    #[test]
    fn test_decode_long_keys() {
        let event = logging_event(json!({
            "level": "info",
            "time": "2026-01-03T12:00:01Z",
            "message": "Started instance",
            "context": ["name", "c1", "project", "default"]
        }));
        let record = event.to_log_record().unwrap();
        assert_eq!(record.level, "info");
        assert_eq!(record.message, "Started instance");
        assert_eq!(record.context.len(), 4);
        assert!(record.time.is_some());
    }

    #[test]
    fn test_decode_short_keys() {
        let event = logging_event(json!({
            "lvl": "dbug",
            "t": "2026-01-03T12:00:01Z",
            "msg": "Polling",
            "ctx": ["interval", 5]
        }));
        let record = event.to_log_record().unwrap();
        assert_eq!(record.level, "dbug");
        assert_eq!(record.message, "Polling");
        assert_eq!(record.context, vec![json!("interval"), json!(5)]);
    }

    #[test]
    fn test_decode_context_object() {
        let event = logging_event(json!({
            "level": "warn",
            "message": "Low disk",
            "context": {"pool": "default", "free": "2GiB"}
        }));
        let record = event.to_log_record().unwrap();
        assert_eq!(record.context.len(), 4);
        assert!(record.time.is_none());
    }

    #[test]
    fn test_decode_missing_context() {
        let event = logging_event(json!({"level": "info", "message": "hello"}));
        assert!(event.to_log_record().unwrap().context.is_empty());
    }

    #[test]
    fn test_decode_malformed_record() {
        let event = logging_event(json!({"level": 3}));
        let err = event.to_log_record().unwrap_err();
        assert!(err.to_string().contains("Failed to decode log record"));
    }

    #[test]
    fn test_decode_non_logging_event() {
        let mut event = logging_event(json!({"level": "info", "message": "x"}));
        event.event_type = "lifecycle".to_string();
        let err = event.to_log_record().unwrap_err();
        assert!(err.to_string().contains("lifecycle"));
    }
}
