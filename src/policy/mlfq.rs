//! Multilevel feedback queue with aging, periodic boost and simulated I/O.
//!
//! Per tick, in order:
//!
//! 1. arrivals join the tail of level 1;
//! 2. on a boost tick, every queued process of levels 2 and 3 moves to the
//!    tail of level 1;
//! 3. a free core dispatches the head of the highest non-empty level; the
//!    I/O oracle may send the chosen process into a simulated I/O wait
//!    instead, in which case the next candidate is tried; a process other
//!    than the one the core last ran first owes the context-switch ticks;
//! 4. queued processes age; one whose wait counter exceeds the threshold
//!    moves up a level;
//! 5. the running process executes one tick, or one owed switch tick;
//! 6. I/O waits count down, and finished ones rejoin level 1;
//! 7. a finished process terminates, one that used its whole quantum moves
//!    down a level.

use tracing::debug;

use crate::engine::{SchedPolicy, Sim};
use crate::process::{ProcState, TOP_LEVEL};
use crate::queue::{Arrivals, ReadyQueue};
use crate::scenario::{MlfqConfig, PolicyKind, MLFQ_LEVELS};
use crate::types::{ProcIdx, Tick};

const BOTTOM_LEVEL: u8 = MLFQ_LEVELS as u8;

/// The slice currently occupying the core.
#[derive(Debug, Clone, Copy)]
struct Slice {
    idx: ProcIdx,
    /// `None` runs until the process finishes.
    quantum: Option<Tick>,
    used: Tick,
    /// Context-switch ticks still to spend before the first run tick.
    switch_left: Tick,
}

#[derive(Debug)]
pub struct Mlfq {
    config: MlfqConfig,
    levels: [ReadyQueue; MLFQ_LEVELS],
    /// Processes in simulated I/O, in the order they blocked.
    blocked: Vec<ProcIdx>,
}

impl Mlfq {
    pub fn new(config: MlfqConfig) -> Self {
        Mlfq {
            config,
            levels: Default::default(),
            blocked: Vec::new(),
        }
    }

    fn queue(&mut self, level: u8) -> &mut ReadyQueue {
        &mut self.levels[level as usize - 1]
    }

    fn enqueue(&mut self, sim: &mut Sim<'_>, idx: ProcIdx, level: u8) {
        let p = sim.proc_mut(idx);
        p.current_queue = level;
        p.wait_counter = 0;
        p.state = ProcState::Ready;
        self.queue(level).push(idx);
    }

    fn boost(&mut self, sim: &mut Sim<'_>) {
        let mut moved = 0;
        for level in TOP_LEVEL + 1..=BOTTOM_LEVEL {
            let drained = self.queue(level).drain();
            for idx in drained {
                self.enqueue(sim, idx, TOP_LEVEL);
                moved += 1;
            }
        }
        if moved > 0 {
            debug!(moved, "priority boost");
        }
    }

    fn dispatch(&mut self, sim: &mut Sim<'_>) -> Option<Slice> {
        loop {
            let level = (TOP_LEVEL..=BOTTOM_LEVEL).find(|&l| !self.queue(l).is_empty())?;
            let idx = self.queue(level).pop()?;
            sim.proc_mut(idx).wait_counter = 0;

            // Coming straight back from I/O always gets to run.
            let returned = std::mem::take(&mut sim.proc_mut(idx).io_returned);
            if !returned && sim.io().blocks_on_dispatch() {
                let io_duration = self.config.io_duration;
                let p = sim.proc_mut(idx);
                p.state = ProcState::Waiting;
                p.io_remaining = io_duration;
                p.io_blocks += 1;
                debug!(pid = %p.pid, level, ticks = io_duration, "blocked on I/O");
                self.blocked.push(idx);
                continue;
            }

            debug!(pid = %sim.proc(idx).pid, level, "dispatch");
            let switch_left = sim.switch_cost(idx);
            if switch_left > 0 {
                sim.log_switch(idx, switch_left);
            }
            return Some(Slice {
                idx,
                quantum: self.config.quantum(level),
                used: 0,
                switch_left,
            });
        }
    }

    fn age(&mut self, sim: &mut Sim<'_>, threshold: Tick) {
        // Levels are visited top-down, so a process promoted into an upper
        // level is not aged twice in one tick.
        for level in TOP_LEVEL..=BOTTOM_LEVEL {
            let members = self.queue(level).ordered();
            for idx in members {
                let p = sim.proc_mut(idx);
                p.wait_counter += 1;
                if p.wait_counter <= threshold {
                    continue;
                }
                p.wait_counter = 0;
                if level == TOP_LEVEL {
                    continue;
                }
                p.aging_promotions += 1;
                debug!(pid = %p.pid, from = level, to = level - 1, "aging promotion");
                self.queue(level).remove(idx);
                self.enqueue(sim, idx, level - 1);
            }
        }
    }

    fn advance_io(&mut self, sim: &mut Sim<'_>) {
        let mut still_blocked = Vec::with_capacity(self.blocked.len());
        for idx in std::mem::take(&mut self.blocked) {
            let p = sim.proc_mut(idx);
            p.io_remaining = p.io_remaining.saturating_sub(1);
            if p.io_remaining > 0 {
                still_blocked.push(idx);
                continue;
            }
            p.io_returned = true;
            debug!(pid = %p.pid, "I/O complete");
            self.enqueue(sim, idx, TOP_LEVEL);
        }
        self.blocked = still_blocked;
    }
}

impl SchedPolicy for Mlfq {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Mlfq
    }

    fn simulate(&mut self, sim: &mut Sim<'_>) {
        let mut arrivals = Arrivals::new();
        let mut running: Option<Slice> = None;

        while !sim.all_done() {
            let now = sim.now();

            arrivals.admit(sim, &mut self.levels[0]);

            if let Some(interval) = self.config.boost_interval {
                if now > 0 && now % interval == 0 {
                    self.boost(sim);
                }
            }

            if running.is_none() {
                running = self.dispatch(sim);
            }

            if let Some(threshold) = self.config.aging_threshold {
                self.age(sim, threshold);
            }

            let finished = match running.as_mut() {
                Some(slice) if slice.switch_left > 0 => {
                    slice.switch_left -= 1;
                    sim.switch_tick();
                    false
                }
                Some(slice) => {
                    slice.used += 1;
                    sim.run_tick(slice.idx)
                }
                None => {
                    sim.idle_tick();
                    false
                }
            };

            self.advance_io(sim);

            if let Some(slice) = running {
                if finished {
                    running = None;
                } else if slice.quantum.is_some_and(|q| slice.used >= q) {
                    let level = sim.proc(slice.idx).current_queue;
                    let lower = (level + 1).min(BOTTOM_LEVEL);
                    debug!(pid = %sim.proc(slice.idx).pid, from = level, to = lower, "quantum expired");
                    self.enqueue(sim, slice.idx, lower);
                    running = None;
                }
            }
        }
    }
}
