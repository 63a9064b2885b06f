//! Tick-driven simulation engine.
//!
//! This is the core of the simulator. [`Engine`] owns the workload, the
//! arrival-sorted process table, the timeline and the run-level counters.
//! Each [`run`](Engine::run) resets that state, builds the configured
//! policy and hands it a [`Sim`]: the explicit simulation state through
//! which every policy advances the clock, executes processes and records
//! the timeline.

use std::cell::Cell;

use tracing::{debug, info, warn};

use crate::io::IoOracle;
use crate::policy;
use crate::process::{ProcState, Process, ProcessDef};
use crate::scenario::{PolicyKind, SchedConfig};
use crate::stats::RunSummary;
use crate::timeline::{Label, Timeline};
use crate::types::{ProcIdx, Tick};

thread_local! {
    static SIM_CLOCK: Cell<Option<Tick>> = const { Cell::new(None) };
}

/// Logical clock of the simulation running on this thread, if any.
///
/// Only used to stamp log lines; the engine never reads it back.
pub fn sim_clock() -> Option<Tick> {
    SIM_CLOCK.with(|c| c.get())
}

fn set_sim_clock(t: Option<Tick>) {
    SIM_CLOCK.with(|c| c.set(t));
}

/// Run-level counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimState {
    /// Logical clock. Equals the number of recorded timeline slots.
    pub current_time: Tick,
    /// Core-ticks that executed a process.
    pub cpu_busy_time: Tick,
}

/// Mutable simulation state handed to a policy for one run.
pub struct Sim<'a> {
    procs: &'a mut [Process],
    timeline: &'a mut Timeline,
    state: &'a mut SimState,
    io: &'a mut dyn IoOracle,
    /// Process the single core last executed, for context-switch charging.
    last_ran: Option<ProcIdx>,
    context_switch: Tick,
}

impl<'a> Sim<'a> {
    pub(crate) fn new(
        procs: &'a mut [Process],
        timeline: &'a mut Timeline,
        state: &'a mut SimState,
        io: &'a mut dyn IoOracle,
        context_switch: Tick,
    ) -> Self {
        Sim {
            procs,
            timeline,
            state,
            io,
            last_ran: None,
            context_switch,
        }
    }

    pub fn now(&self) -> Tick {
        self.state.current_time
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    pub fn proc(&self, idx: ProcIdx) -> &Process {
        &self.procs[idx.0]
    }

    pub fn proc_mut(&mut self, idx: ProcIdx) -> &mut Process {
        &mut self.procs[idx.0]
    }

    pub fn all_done(&self) -> bool {
        self.procs.iter().all(Process::is_done)
    }

    pub fn io(&mut self) -> &mut dyn IoOracle {
        &mut *self.io
    }

    /// Mark a newly arrived process as ready.
    pub fn admit(&mut self, idx: ProcIdx) {
        let p = &mut self.procs[idx.0];
        if p.state == ProcState::New {
            p.state = ProcState::Ready;
        }
    }

    /// Mark every process that has arrived by now as ready.
    pub fn admit_arrived(&mut self) {
        let now = self.state.current_time;
        for p in self.procs.iter_mut() {
            if p.state == ProcState::New && p.has_arrived(now) {
                p.state = ProcState::Ready;
            }
        }
    }

    /// Arrived, unfinished processes, in table order.
    pub fn eligible(&self) -> Vec<ProcIdx> {
        let now = self.state.current_time;
        self.procs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.has_arrived(now) && !p.is_done())
            .map(|(i, _)| ProcIdx(i))
            .collect()
    }

    /// Context-switch ticks owed before `idx` can run on the single core.
    ///
    /// Zero for the very first dispatch of a run and when the core last ran
    /// `idx` itself.
    pub fn switch_cost(&self, idx: ProcIdx) -> Tick {
        match self.last_ran {
            Some(prev) if prev != idx => self.context_switch,
            _ => 0,
        }
    }

    /// Charge context-switch ticks if the core last ran a different process.
    pub fn context_switch_to(&mut self, idx: ProcIdx) {
        let ticks = self.switch_cost(idx);
        if ticks == 0 {
            return;
        }
        self.log_switch(idx, ticks);
        for _ in 0..ticks {
            self.switch_tick();
        }
    }

    pub(crate) fn log_switch(&self, to: ProcIdx, ticks: Tick) {
        if let Some(prev) = self.last_ran {
            debug!(
                from = %self.procs[prev.0].pid,
                to = %self.procs[to.0].pid,
                ticks,
                "context switch"
            );
        }
    }

    /// Single-core tick spent switching processes.
    pub fn switch_tick(&mut self) {
        self.advance(vec![Label::ContextSwitch]);
    }

    /// Execute one tick of `idx` without advancing the clock.
    ///
    /// Returns true if the process finished; its completion time is the end
    /// of the current tick.
    pub fn execute(&mut self, idx: ProcIdx) -> bool {
        let now = self.state.current_time;
        let p = &mut self.procs[idx.0];
        debug_assert!(p.remaining_time > 0, "{} executed after completion", p.pid);
        if p.start_time.is_none() {
            p.start_time = Some(now);
            debug!(pid = %p.pid, "first dispatch");
        }
        p.state = ProcState::Running;
        p.remaining_time -= 1;
        self.state.cpu_busy_time += 1;
        if p.remaining_time == 0 {
            p.state = ProcState::Terminated;
            p.completion_time = Some(now + 1);
            debug!(pid = %p.pid, completion = now + 1, "completed");
            true
        } else {
            false
        }
    }

    /// Single-core tick running `idx`. Returns true if it finished.
    pub fn run_tick(&mut self, idx: ProcIdx) -> bool {
        let done = self.execute(idx);
        self.last_ran = Some(idx);
        self.advance(vec![Label::Run(idx)]);
        done
    }

    /// Single-core tick with nothing to run.
    pub fn idle_tick(&mut self) {
        self.advance(vec![Label::Idle]);
    }

    /// Close the current tick: record one slot and move the clock forward.
    pub fn advance(&mut self, labels: Vec<Label>) {
        self.timeline.record(labels);
        self.state.current_time += 1;
        set_sim_clock(Some(self.state.current_time));
    }
}

/// A simulation behavior: one scheduling algorithm.
pub trait SchedPolicy {
    fn kind(&self) -> PolicyKind;

    /// Drive `sim` until every process has completed.
    fn simulate(&mut self, sim: &mut Sim<'_>);
}

/// The scheduler simulator: a workload plus a configuration, replayable.
pub struct Engine {
    workload: Vec<ProcessDef>,
    config: SchedConfig,
    procs: Vec<Process>,
    timeline: Timeline,
    state: SimState,
}

impl Engine {
    /// Definitions with a zero burst time are skipped with a warning.
    pub fn new(workload: Vec<ProcessDef>, config: SchedConfig) -> Self {
        let workload = workload
            .into_iter()
            .filter(|def| {
                if def.burst_time == 0 {
                    warn!(pid = %def.pid, "skipping process with zero burst time");
                    return false;
                }
                true
            })
            .collect();
        let mut engine = Engine {
            workload,
            timeline: Timeline::empty(config.effective_cores()),
            config,
            procs: Vec::new(),
            state: SimState::default(),
        };
        engine.reset();
        engine
    }

    /// Rebuild the process table from the workload and clear all results.
    ///
    /// The table is sorted by arrival time; the sort is stable, so equal
    /// arrivals keep their input order.
    pub fn reset(&mut self) {
        let mut procs: Vec<Process> = self.workload.iter().map(Process::new).collect();
        procs.sort_by_key(|p| p.arrival_time);
        for p in &mut procs {
            p.reset();
        }
        self.timeline = Timeline::new(self.config.effective_cores(), &procs);
        self.procs = procs;
        self.state = SimState::default();
    }

    /// Select the policy for the next run. Results of the previous run are
    /// discarded.
    pub fn set_policy(&mut self, policy: PolicyKind) {
        self.config.policy = policy;
        self.reset();
    }

    /// Run the configured policy to completion, drawing I/O decisions from
    /// a fresh oracle built from the configured I/O model.
    pub fn run(&mut self) {
        let mut oracle = self.config.io.oracle();
        self.run_with_oracle(oracle.as_mut());
    }

    /// Run the configured policy to completion with an injected I/O oracle.
    pub fn run_with_oracle(&mut self, io: &mut dyn IoOracle) {
        self.reset();
        let mut policy = policy::build(&self.config);
        info!(
            policy = %policy.kind(),
            processes = self.procs.len(),
            cores = self.config.effective_cores(),
            quantum = self.config.quantum,
            "starting simulation"
        );

        set_sim_clock(Some(0));
        {
            let mut sim = Sim::new(
                &mut self.procs,
                &mut self.timeline,
                &mut self.state,
                io,
                self.config.context_switch,
            );
            policy.simulate(&mut sim);
        }
        for p in &mut self.procs {
            p.finalize();
        }
        info!(
            total_time = self.state.current_time,
            cpu_busy_time = self.state.cpu_busy_time,
            "simulation complete"
        );
        set_sim_clock(None);
    }

    pub fn config(&self) -> &SchedConfig {
        &self.config
    }

    /// The process table in arrival order, with timing fields filled in
    /// after a run.
    pub fn processes(&self) -> &[Process] {
        &self.procs
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn current_time(&self) -> Tick {
        self.state.current_time
    }

    pub fn cpu_busy_time(&self) -> Tick {
        self.state.cpu_busy_time
    }

    /// Look up a process by pid.
    pub fn process(&self, pid: &str) -> Option<&Process> {
        self.procs.iter().find(|p| p.pid == pid)
    }

    /// Aggregate metrics of the last run.
    pub fn summary(&self) -> RunSummary {
        RunSummary::new(
            self.config.policy,
            self.config.effective_cores(),
            &self.procs,
            self.state.current_time,
            self.state.cpu_busy_time,
        )
    }
}
