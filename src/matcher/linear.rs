//! # Scan-based pattern store.
//!
//! [`LinearStore`] keeps `(pattern, value)` entries in a flat vector and
//! answers lookups by scanning. Lookup cost is linear in the number of
//! registered patterns, which is the right trade for the registration counts
//! this emitter is built for; swap in an indexed store through the builder
//! when pattern counts grow.

use crate::message::{Message, Pattern};

use super::PatternStore;

struct Entry<V> {
    pattern: Pattern,
    value: V,
}

/// Flat-scan [`PatternStore`] implementation.
#[derive(Default)]
pub struct LinearStore<V> {
    entries: Vec<Entry<V>>,
}

impl<V> LinearStore<V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, pattern: &Pattern) -> Option<usize> {
        self.entries.iter().position(|e| &e.pattern == pattern)
    }
}

impl<V: Send + Sync> PatternStore<V> for LinearStore<V> {
    fn add(&mut self, pattern: Pattern, value: V) {
        match self.position(&pattern) {
            Some(i) => self.entries[i].value = value,
            None => self.entries.push(Entry { pattern, value }),
        }
    }

    fn find_exact(&self, pattern: &Pattern) -> Option<&V> {
        self.position(pattern).map(|i| &self.entries[i].value)
    }

    fn find_best(&self, message: &Message) -> Option<&V> {
        self.entries
            .iter()
            .filter(|e| e.pattern.matches(message))
            .max_by(|a, b| a.pattern.closeness(&b.pattern))
            .map(|e| &e.value)
    }

    fn remove(&mut self, pattern: &Pattern) -> Option<V> {
        self.position(pattern)
            .map(|i| self.entries.remove(i).value)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LinearStore<&'static str> {
        LinearStore::new()
    }

    #[test]
    fn add_then_find_exact() {
        let mut s = store();
        s.add(Pattern::new().with("a", 1), "one");
        assert_eq!(s.find_exact(&Pattern::new().with("a", 1)), Some(&"one"));
        assert_eq!(s.find_exact(&Pattern::new().with("a", 2)), None);
    }

    #[test]
    fn add_overwrites_exact_pattern() {
        let mut s = store();
        s.add(Pattern::new().with("a", 1), "old");
        s.add(Pattern::new().with("a", 1), "new");
        assert_eq!(s.len(), 1);
        assert_eq!(s.find_exact(&Pattern::new().with("a", 1)), Some(&"new"));
    }

    #[test]
    fn best_match_is_superset_aware() {
        let mut s = store();
        s.add(Pattern::new().with("a", 1), "a1");

        let matching = Message::new().with("a", 1).with("b", 2);
        let wrong_value = Message::new().with("a", 2);

        assert_eq!(s.find_best(&matching), Some(&"a1"));
        assert_eq!(s.find_best(&wrong_value), None);
    }

    #[test]
    fn most_specific_pattern_wins() {
        let mut s = store();
        s.add(Pattern::new().with("a", 1), "wide");
        s.add(Pattern::new().with("a", 1).with("b", 2), "narrow");

        let msg = Message::new().with("a", 1).with("b", 2).with("c", 3);
        assert_eq!(s.find_best(&msg), Some(&"narrow"));

        // Only the wide pattern matches when "b" differs.
        let msg = Message::new().with("a", 1).with("b", 9);
        assert_eq!(s.find_best(&msg), Some(&"wide"));
    }

    #[test]
    fn equal_arity_tie_breaks_on_key_order() {
        let mut s = store();
        s.add(Pattern::new().with("b", 2), "b-side");
        s.add(Pattern::new().with("a", 1), "a-side");

        let msg = Message::new().with("a", 1).with("b", 2);
        assert_eq!(s.find_best(&msg), Some(&"a-side"));
    }

    #[test]
    fn empty_pattern_is_a_catch_all() {
        let mut s = store();
        s.add(Pattern::new(), "any");
        s.add(Pattern::new().with("a", 1), "a1");

        assert_eq!(s.find_best(&Message::new().with("x", "y")), Some(&"any"));
        assert_eq!(s.find_best(&Message::new().with("a", 1)), Some(&"a1"));
    }

    #[test]
    fn remove_deletes_the_entry() {
        let mut s = store();
        s.add(Pattern::new().with("a", 1), "one");
        assert_eq!(s.remove(&Pattern::new().with("a", 1)), Some("one"));
        assert!(s.is_empty());
        assert_eq!(s.remove(&Pattern::new().with("a", 1)), None);
    }
}
