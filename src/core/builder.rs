//! # Builder for constructing an emitter with optional parts.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::EmitterConfig;
use crate::dispatch::queue::QueueState;
use crate::events::Bus;
use crate::listeners::Listeners;
use crate::matcher::{LinearStore, PatternStore};

use super::emitter::{Emitter, Shared};
use super::registry::Registry;

/// Builder for an [`Emitter`].
///
/// The only optional part is the pattern store: the default is the in-tree
/// [`LinearStore`]; inject anything else that implements [`PatternStore`]
/// to swap the matching algorithm without touching the dispatch core.
pub struct EmitterBuilder {
    cfg: EmitterConfig,
    store: Option<Box<dyn PatternStore<Listeners>>>,
}

impl EmitterBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: EmitterConfig) -> Self {
        Self { cfg, store: None }
    }

    /// Uses a custom pattern store for listener lookup.
    pub fn with_store(mut self, store: impl PatternStore<Listeners> + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Builds the emitter: event bus, registry, and admission state.
    pub fn build(self) -> Emitter {
        let store = self
            .store
            .unwrap_or_else(|| Box::new(LinearStore::new()));

        Emitter::from_shared(Arc::new(Shared {
            cfg: self.cfg,
            registry: Registry::new(store),
            state: Mutex::new(QueueState::default()),
            bus: Bus::new(self.cfg.bus_capacity_clamped()),
        }))
    }
}
