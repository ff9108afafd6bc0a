//! # Message: the unit of dispatch.
//!
//! A [`Message`] is a mapping from attribute name to JSON value, of arbitrary
//! depth and shape, supplied by the caller at submission time. It is used both
//! as the delivery payload and as the matching key: listeners receive the
//! whole message, and the pattern store selects listeners by inspecting its
//! top-level attributes.
//!
//! Messages are immutable once submitted; the emitter shares one
//! `Arc<Message>` across the whole fan-out.
//!
//! ## Example
//! ```
//! use patbus::Message;
//! use serde_json::json;
//!
//! let msg = Message::new()
//!     .with("topic", "orders/created")
//!     .with("payload", json!({ "id": 42 }));
//!
//! assert_eq!(msg.get("topic"), Some(&json!("orders/created")));
//! assert_eq!(msg.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AttrError;

use super::json_kind;

/// An immutable structured record: attribute name → value.
///
/// Construct with [`Message::new`] + [`Message::with`], or convert from any
/// JSON object via `TryFrom<serde_json::Value>`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message {
    attrs: Map<String, Value>,
}

impl Message {
    /// Creates an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the message with `key` set to `value` (builder style).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Returns the value of a top-level attribute, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// Iterates over the top-level attributes.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attrs.iter()
    }

    /// Number of top-level attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// True if the message carries no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

impl From<Map<String, Value>> for Message {
    fn from(attrs: Map<String, Value>) -> Self {
        Self { attrs }
    }
}

impl TryFrom<Value> for Message {
    type Error = AttrError;

    /// Accepts JSON objects only; anything else fails fast.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(attrs) => Ok(Self { attrs }),
            other => Err(AttrError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }
}
