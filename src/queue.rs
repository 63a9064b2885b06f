//! Ready queues.
//!
//! A [`ReadyQueue`] is a FIFO of process-table indices. [`Arrivals`] feeds
//! newly arrived processes into a queue in table order, which is arrival
//! order with ties kept in input order.

use std::collections::VecDeque;

use crate::engine::Sim;
use crate::types::ProcIdx;

/// A FIFO ready queue.
#[derive(Debug, Clone, Default)]
pub struct ReadyQueue {
    entries: VecDeque<ProcIdx>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        ReadyQueue {
            entries: VecDeque::new(),
        }
    }

    /// Append at the tail.
    pub fn push(&mut self, idx: ProcIdx) {
        debug_assert!(!self.contains(idx), "process {} queued twice", idx.0);
        self.entries.push_back(idx);
    }

    /// Take the head.
    pub fn pop(&mut self) -> Option<ProcIdx> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, idx: ProcIdx) -> bool {
        self.entries.contains(&idx)
    }

    /// Queued indices, head first, without consuming.
    pub fn ordered(&self) -> Vec<ProcIdx> {
        self.entries.iter().copied().collect()
    }

    /// Remove a specific index. Returns true if found.
    pub fn remove(&mut self, idx: ProcIdx) -> bool {
        if let Some(pos) = self.entries.iter().position(|&i| i == idx) {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }

    /// Remove and return every entry, head first.
    pub fn drain(&mut self) -> Vec<ProcIdx> {
        self.entries.drain(..).collect()
    }
}

/// Cursor over the arrival-sorted process table.
#[derive(Debug, Clone, Default)]
pub struct Arrivals {
    next: usize,
}

impl Arrivals {
    pub fn new() -> Self {
        Arrivals { next: 0 }
    }

    /// Queue every process that has arrived by the current tick and was not
    /// queued before. Returns how many were admitted.
    pub fn admit(&mut self, sim: &mut Sim<'_>, queue: &mut ReadyQueue) -> usize {
        let now = sim.now();
        let mut admitted = 0;
        while self.next < sim.len() && sim.proc(ProcIdx(self.next)).has_arrived(now) {
            let idx = ProcIdx(self.next);
            sim.admit(idx);
            queue.push(idx);
            self.next += 1;
            admitted += 1;
        }
        admitted
    }
}
