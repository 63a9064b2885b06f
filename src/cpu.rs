//! Simulated core state.

use crate::types::{CoreId, ProcIdx, Tick};

/// A simulated core.
#[derive(Debug, Clone)]
pub struct SimCore {
    /// Core ID.
    pub id: CoreId,
    /// Process currently occupying this core, or None if idle.
    pub running: Option<ProcIdx>,
    /// Ticks the running process has consumed of its current quantum.
    pub slice_used: Tick,
}

impl SimCore {
    pub fn new(id: CoreId) -> Self {
        SimCore {
            id,
            running: None,
            slice_used: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    /// Put `idx` on this core with a fresh quantum.
    pub fn assign(&mut self, idx: ProcIdx) {
        debug_assert!(self.is_idle(), "core {} already busy", self.id);
        self.running = Some(idx);
        self.slice_used = 0;
    }

    /// Take the running process off this core.
    pub fn release(&mut self) -> Option<ProcIdx> {
        self.slice_used = 0;
        self.running.take()
    }
}
