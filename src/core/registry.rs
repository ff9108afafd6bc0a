//! # Listener registry — listener lists on top of the pattern store.
//!
//! The store associates exactly one value per exact pattern, but many
//! listeners may share a pattern, so the registry stores an ordered
//! [`Listeners`] list as each pattern's value.
//!
//! ## Rules
//! - Registration order defines fan-out invocation order (not completion
//!   order).
//! - Removal matches by handle identity (`Arc::ptr_eq`), first occurrence.
//! - A pattern whose list empties is removed from the store entirely; no
//!   dead entries survive.
//! - Mutation happens only here; dispatch reads through [`Registry::resolve`],
//!   which clones the matched list out of the lock.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::listeners::{ListenerRef, Listeners};
use crate::matcher::PatternStore;
use crate::message::{Message, Pattern};

/// Listener lists keyed by exact pattern, backed by a swappable store.
pub(crate) struct Registry {
    store: RwLock<Box<dyn PatternStore<Listeners>>>,
}

impl Registry {
    pub fn new(store: Box<dyn PatternStore<Listeners>>) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Appends `listener` to the exact pattern's list, creating the entry if
    /// absent. Always succeeds.
    pub fn register(&self, pattern: Pattern, listener: ListenerRef) {
        let mut store = self.store.write();
        let mut entry = store.find_exact(&pattern).cloned().unwrap_or_default();
        entry.push(listener);
        store.add(pattern, entry);
    }

    /// Removes the first identity-occurrence of `listener` under the exact
    /// pattern. Removing the last listener removes the pattern entry itself.
    ///
    /// Returns `false` (silent no-op) when the pattern or listener is not
    /// registered.
    pub fn unregister(&self, pattern: &Pattern, listener: &ListenerRef) -> bool {
        let mut store = self.store.write();
        let mut entry = match store.find_exact(pattern) {
            Some(entry) => entry.clone(),
            None => return false,
        };
        let position = match entry.iter().position(|l| Arc::ptr_eq(l, listener)) {
            Some(position) => position,
            None => return false,
        };
        entry.remove(position);
        if entry.is_empty() {
            store.remove(pattern);
        } else {
            store.add(pattern.clone(), entry);
        }
        true
    }

    /// Returns the best-matching listener list for `message`, cloned out so
    /// the caller never fans out under the registry lock.
    pub fn resolve(&self, message: &Message) -> Option<Listeners> {
        self.store.read().find_best(message).cloned()
    }

    #[cfg(test)]
    pub fn pattern_count(&self) -> usize {
        self.store.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Ack;
    use crate::listeners::ListenerFn;
    use crate::matcher::LinearStore;

    fn registry() -> Registry {
        Registry::new(Box::new(LinearStore::new()))
    }

    fn listener(name: &'static str) -> ListenerRef {
        ListenerFn::arc(name, |_msg: Arc<Message>, ack: Ack| async move {
            ack.done();
        })
    }

    #[test]
    fn register_preserves_order() {
        let reg = registry();
        let pat = Pattern::new().with("topic", "t");
        reg.register(pat.clone(), listener("first"));
        reg.register(pat, listener("second"));

        let resolved = reg.resolve(&Message::new().with("topic", "t")).unwrap();
        let names: Vec<&str> = resolved.iter().map(|l| l.name()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn unregister_matches_by_identity() {
        let reg = registry();
        let pat = Pattern::new().with("topic", "t");
        let keep = listener("keep");
        let drop_me = listener("drop");
        reg.register(pat.clone(), keep.clone());
        reg.register(pat.clone(), drop_me.clone());

        assert!(reg.unregister(&pat, &drop_me));

        let resolved = reg.resolve(&Message::new().with("topic", "t")).unwrap();
        assert_eq!(resolved.len(), 1);
        assert!(Arc::ptr_eq(&resolved[0], &keep));
    }

    #[test]
    fn removing_last_listener_purges_the_pattern() {
        let reg = registry();
        let pat = Pattern::new().with("topic", "t");
        let only = listener("only");
        reg.register(pat.clone(), only.clone());
        assert_eq!(reg.pattern_count(), 1);

        assert!(reg.unregister(&pat, &only));
        assert_eq!(reg.pattern_count(), 0);
        assert!(reg.resolve(&Message::new().with("topic", "t")).is_none());
    }

    #[test]
    fn unregister_unknown_is_a_noop() {
        let reg = registry();
        let pat = Pattern::new().with("topic", "t");
        let registered = listener("registered");
        let stranger = listener("stranger");

        assert!(!reg.unregister(&pat, &stranger));

        reg.register(pat.clone(), registered);
        assert!(!reg.unregister(&pat, &stranger));
        assert_eq!(reg.pattern_count(), 1);
    }
}
