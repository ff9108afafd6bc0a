//! # Emitter configuration.
//!
//! [`EmitterConfig`] defines the emitter's behavior: the dispatch concurrency
//! ceiling and the capacity of the event bus.
//!
//! # Example
//! ```
//! use patbus::EmitterConfig;
//!
//! let mut cfg = EmitterConfig::default();
//! cfg.concurrency = 4;
//!
//! assert_eq!(cfg.concurrency_limit(), Some(4));
//! ```

/// Configuration for an [`Emitter`](crate::Emitter) instance.
///
/// Controls the admission ceiling and event-bus sizing.
#[derive(Clone, Copy, Debug)]
pub struct EmitterConfig {
    /// Maximum number of messages dispatched concurrently (0 = unbounded).
    ///
    /// With a positive ceiling, submissions past the ceiling are queued FIFO
    /// and admitted as in-flight dispatches complete. With `0`, every
    /// submission is dispatched immediately and nothing is ever queued.
    pub concurrency: usize,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for EmitterConfig {
    /// Provides a default configuration:
    /// - `concurrency = 0` (unbounded)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            concurrency: 0,
            bus_capacity: 1024,
        }
    }
}

impl EmitterConfig {
    /// Returns the admission ceiling, treating `0` as "no limit".
    pub fn concurrency_limit(&self) -> Option<usize> {
        match self.concurrency {
            0 => None,
            n => Some(n),
        }
    }

    /// Returns the bus capacity clamped to the minimum the channel accepts.
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}
