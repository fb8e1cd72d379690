//! Context unpacking for log records

use indexmap::IndexMap;
use serde_json::Value;

/// Context fields in arrival order
pub type Fields = IndexMap<String, String>;

/// Turn alternating key/value tokens into fields.
///
/// A trailing key without a value is dropped. A repeated key keeps its first position
/// and takes the last value.
pub fn unpack(tokens: &[Value]) -> Fields {
    let mut fields = Fields::new();
    for pair in tokens.chunks_exact(2) {
        fields.insert(display_token(&pair[0]), display_token(&pair[1]));
    }
    fields
}

/// Display form of a single token
pub fn display_token(token: &Value) -> String {
    match token {
        Value::String(s) => s.clone(),
        Value::Null => "<nil>".to_string(),
        other => other.to_string(),
    }
}
