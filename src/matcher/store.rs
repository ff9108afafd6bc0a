//! # Pattern store contract.
//!
//! Associates exactly one value with each exact [`Pattern`] and answers two
//! kinds of lookups:
//! - **exact**: the value registered at precisely this pattern;
//! - **best**: the value of the most specific registered pattern that the
//!   given [`Message`] is a superset of.
//!
//! ## Rules
//! - `add` overwrites any prior value at the exact pattern.
//! - `find_best` resolves specificity by key count, then by the
//!   lexicographically earlier key sequence ([`Pattern::closeness`]).
//! - Implementations are storage only; they never invoke the values.

use crate::message::{Message, Pattern};

/// Capability-scoped pattern → value store.
///
/// The dispatch core keeps listener lists as the stored values, but the
/// store is generic: it neither knows nor cares what it holds.
pub trait PatternStore<V>: Send + Sync {
    /// Registers `value` under exact `pattern`, overwriting any prior value.
    fn add(&mut self, pattern: Pattern, value: V);

    /// Returns the value stored at exactly `pattern`, if any.
    fn find_exact(&self, pattern: &Pattern) -> Option<&V>;

    /// Returns the value of the closest registered pattern matching
    /// `message`, if any pattern matches at all.
    fn find_best(&self, message: &Message) -> Option<&V>;

    /// Deletes the exact-pattern entry, returning its value.
    fn remove(&mut self, pattern: &Pattern) -> Option<V>;

    /// Number of registered patterns.
    fn len(&self) -> usize;

    /// True if no patterns are registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
