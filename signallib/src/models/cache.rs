use arc_swap::ArcSwapOption;
use std::sync::Arc;

use crate::models::trading_signal::Signal;

/// Single-slot store for the most recently selected signal.
///
/// Clones share the same slot. Only [`SignalSelector`](crate::models::SignalSelector) writes
/// to it; every other holder reads. Replacement is a single pointer swap, so readers see either
/// the previous signal or the new one.
#[derive(Debug, Clone, Default)]
pub struct SignalCache {
    slot: Arc<ArcSwapOption<Signal>>,
}

impl SignalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<Signal>> {
        self.slot.load_full()
    }

    pub(crate) fn publish(&self, signal: Option<Signal>) {
        self.slot.store(signal.map(Arc::new));
    }
}
