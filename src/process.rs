//! Process model for the simulator.
//!
//! A [`ProcessDef`] is the immutable workload record. The engine turns each
//! one into a [`Process`], which additionally carries the mutable state the
//! policies drive: remaining work, MLFQ level, aging counter, I/O blocking
//! and the timing fields filled in as the simulation progresses.

use serde::Serialize;

use crate::types::Tick;

/// Highest MLFQ level. Levels count downwards in priority: 1 beats 2 beats 3.
pub const TOP_LEVEL: u8 = 1;

/// Definition of a process for workload creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessDef {
    pub pid: String,
    /// Tick at which the process becomes eligible to run.
    pub arrival_time: Tick,
    /// Total CPU ticks required. Must be positive.
    pub burst_time: Tick,
    /// Lower value means higher priority. Only the priority policy reads it.
    pub priority: i32,
}

impl ProcessDef {
    pub fn new(pid: impl Into<String>, arrival_time: Tick, burst_time: Tick, priority: i32) -> Self {
        ProcessDef {
            pid: pid.into(),
            arrival_time,
            burst_time,
            priority,
        }
    }
}

/// The state a simulated process can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ProcState {
    /// Not yet admitted (before its arrival tick, or before any policy looked at it).
    #[default]
    New,
    /// Arrived and runnable, waiting for a core.
    Ready,
    /// Executing on a core.
    Running,
    /// Blocked on simulated I/O.
    Waiting,
    /// All burst ticks consumed.
    Terminated,
}

/// A simulated process at runtime.
#[derive(Debug, Clone, Serialize)]
pub struct Process {
    pub pid: String,
    pub arrival_time: Tick,
    pub burst_time: Tick,
    pub priority: i32,

    /// Ticks left until completion. Never exceeds `burst_time`.
    pub remaining_time: Tick,
    /// Tick of the first executed tick. Set exactly once.
    pub start_time: Option<Tick>,
    /// Tick at which `remaining_time` reached zero.
    pub completion_time: Option<Tick>,
    /// Filled in by [`Process::finalize`] once the process has completed.
    pub waiting_time: Option<Tick>,
    pub turnaround_time: Option<Tick>,

    pub state: ProcState,

    /// MLFQ level, starting at [`TOP_LEVEL`].
    pub current_queue: u8,
    /// Consecutive ticks spent ready but not running (MLFQ aging).
    pub wait_counter: Tick,
    /// Ticks of simulated I/O left while `state == Waiting`.
    pub io_remaining: Tick,
    /// Set when the process comes back from I/O; its next dispatch skips
    /// the I/O draw so it always makes progress.
    pub io_returned: bool,

    /// Number of aging promotions over the run.
    pub aging_promotions: u32,
    /// Number of simulated I/O waits over the run.
    pub io_blocks: u32,
}

impl Process {
    pub fn new(def: &ProcessDef) -> Self {
        Process {
            pid: def.pid.clone(),
            arrival_time: def.arrival_time,
            burst_time: def.burst_time,
            priority: def.priority,
            remaining_time: def.burst_time,
            start_time: None,
            completion_time: None,
            waiting_time: None,
            turnaround_time: None,
            state: ProcState::New,
            current_queue: TOP_LEVEL,
            wait_counter: 0,
            io_remaining: 0,
            io_returned: false,
            aging_promotions: 0,
            io_blocks: 0,
        }
    }

    /// Restore every mutable field to its initial value.
    pub fn reset(&mut self) {
        self.remaining_time = self.burst_time;
        self.start_time = None;
        self.completion_time = None;
        self.waiting_time = None;
        self.turnaround_time = None;
        self.state = ProcState::New;
        self.current_queue = TOP_LEVEL;
        self.wait_counter = 0;
        self.io_remaining = 0;
        self.io_returned = false;
        self.aging_promotions = 0;
        self.io_blocks = 0;
    }

    pub fn has_arrived(&self, now: Tick) -> bool {
        self.arrival_time <= now
    }

    pub fn is_done(&self) -> bool {
        self.remaining_time == 0
    }

    pub fn is_waiting_for_io(&self) -> bool {
        self.state == ProcState::Waiting
    }

    /// Derive turnaround and waiting time from the completion tick.
    ///
    /// Waiting time is clamped at zero. A process that never completed keeps
    /// both fields unset.
    pub fn finalize(&mut self) {
        let Some(completion) = self.completion_time else {
            return;
        };
        let turnaround = completion.saturating_sub(self.arrival_time);
        self.turnaround_time = Some(turnaround);
        self.waiting_time = Some(turnaround.saturating_sub(self.burst_time));
    }
}
