//! # Pattern: a partial key/value constraint.
//!
//! A [`Pattern`] selects messages by superset match: a message matches when it
//! contains at least the pattern's key/value pairs. More specific patterns
//! (more keys) are considered closer matches than less specific ones.
//!
//! Patterns are immutable once registered. The empty pattern is legal and
//! acts as a catch-all of minimal specificity.
//!
//! ## Example
//! ```
//! use patbus::{Message, Pattern};
//!
//! let pat = Pattern::new().with("topic", "metrics");
//! let msg = Message::new().with("topic", "metrics").with("value", 3);
//!
//! assert!(pat.matches(&msg));
//! assert!(!pat.matches(&Message::new().with("topic", "logs")));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AttrError;

use super::{json_kind, Message};

/// A mapping from attribute name to required value.
///
/// Keys are kept sorted so two patterns with the same pairs compare equal and
/// specificity ties break deterministically.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    pairs: BTreeMap<String, Value>,
}

impl Pattern {
    /// Creates an empty (catch-all) pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pattern with `key` required to equal `value` (builder style).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.pairs.insert(key.into(), value.into());
        self
    }

    /// True if `message` contains every pair of this pattern (superset match).
    pub fn matches(&self, message: &Message) -> bool {
        self.pairs
            .iter()
            .all(|(key, value)| message.get(key) == Some(value))
    }

    /// Number of constrained keys; more keys = more specific.
    pub fn specificity(&self) -> usize {
        self.pairs.len()
    }

    /// Orders two patterns by closeness: more keys win, then the
    /// lexicographically earlier sorted key sequence wins.
    ///
    /// `Ordering::Greater` means `self` is the closer match. Patterns with
    /// identical key sequences compare `Equal`; for one message only one of
    /// them can match, so the store never has to break that tie.
    pub fn closeness(&self, other: &Pattern) -> Ordering {
        self.specificity()
            .cmp(&other.specificity())
            .then_with(|| other.keys().cmp(self.keys()))
    }

    /// Iterates over the constrained keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.pairs.keys().map(String::as_str)
    }

    /// True if the pattern constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl TryFrom<Value> for Pattern {
    type Error = AttrError;

    /// Accepts JSON objects only; anything else fails fast.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self {
                pairs: map.into_iter().collect(),
            }),
            other => Err(AttrError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }
}
