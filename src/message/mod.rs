//! Structured messages and the partial-match patterns that select them.
//!
//! - [`Message`]: an immutable attribute map submitted for dispatch;
//! - [`Pattern`]: a key/value constraint a message must be a superset of.

mod message;
mod pattern;

pub use message::Message;
pub use pattern::Pattern;

/// JSON type name used in conversion errors.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
