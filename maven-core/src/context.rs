//! Shared simulation context.
//!
//! The counters here used to be process-wide globals in older simulators
//! of this family. Keeping them on an explicit context object lets
//! multiple simulator instances coexist, which the tests rely on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters shared by every processor of one simulator instance.
#[derive(Debug, Default)]
pub struct SimContext {
    /// COP0 cycle counter, read by guest code via mfc0 COUNT_LO/HI.
    cop0_count: AtomicU64,
    /// Cycle counter used only when statistics collection is on.
    stat_cycle_count: AtomicU64,
}

impl SimContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn cop0_count(&self) -> u64 {
        self.cop0_count.load(Ordering::Relaxed)
    }

    pub fn tick(&self) {
        self.cop0_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stat_cycles(&self) -> u64 {
        self.stat_cycle_count.load(Ordering::Relaxed)
    }

    pub fn stat_tick(&self) {
        self.stat_cycle_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.cop0_count.store(0, Ordering::Relaxed);
        self.stat_cycle_count.store(0, Ordering::Relaxed);
    }
}
