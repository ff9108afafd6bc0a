//! Error types used by the emitter and the message/pattern conversions.
//!
//! This module defines two error enums:
//!
//! - [`EmitError`] — a submission was refused by the admission gate.
//! - [`AttrError`] — a JSON value could not be used as an attribute map.
//!
//! Both types provide `as_label()` for logging/metrics.

use thiserror::Error;

use crate::message::Message;

/// # Errors produced when a submission is refused.
///
/// Only [`Emitter::try_emit`](crate::Emitter::try_emit) refuses messages;
/// `emit`/`emit_with` queue instead. The refused message is handed back to
/// the caller so it can be retried or dropped deliberately.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EmitError {
    /// The concurrency ceiling is reached and the caller opted out of queuing.
    #[error("concurrency ceiling reached; message refused ({pending} pending)")]
    Saturated {
        /// The message that was not accepted.
        message: Message,
        /// Pending-queue depth observed at refusal time.
        pending: usize,
    },
}

impl EmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EmitError::Saturated { .. } => "emit_saturated",
        }
    }

    /// Recovers the refused message.
    pub fn into_message(self) -> Message {
        match self {
            EmitError::Saturated { message, .. } => message,
        }
    }
}

/// # Errors produced by attribute-map conversions.
///
/// [`Message`](crate::Message) and [`Pattern`](crate::Pattern) are maps from
/// attribute name to value; converting from arbitrary JSON fails fast when
/// the value is not an object.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrError {
    /// The JSON value is not an object (array, string, number, bool, null).
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// JSON type name of the rejected value.
        found: &'static str,
    },
}

impl AttrError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            AttrError::NotAnObject { .. } => "attr_not_an_object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturated_returns_message() {
        let err = EmitError::Saturated {
            message: Message::new().with("topic", "t"),
            pending: 3,
        };
        assert_eq!(err.as_label(), "emit_saturated");
        let msg = err.into_message();
        assert_eq!(msg.get("topic"), Some(&serde_json::json!("t")));
    }

    #[test]
    fn attr_error_label() {
        let err = AttrError::NotAnObject { found: "array" };
        assert_eq!(err.as_label(), "attr_not_an_object");
        assert_eq!(err.to_string(), "expected a JSON object, found array");
    }
}
