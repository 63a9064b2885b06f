//! First-come-first-served.

use tracing::debug;

use crate::engine::{SchedPolicy, Sim};
use crate::scenario::PolicyKind;
use crate::types::ProcIdx;

/// Runs processes to completion in arrival order.
#[derive(Debug, Default)]
pub struct Fcfs;

impl SchedPolicy for Fcfs {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fcfs
    }

    fn simulate(&mut self, sim: &mut Sim<'_>) {
        for i in 0..sim.len() {
            let idx = ProcIdx(i);
            while !sim.proc(idx).has_arrived(sim.now()) {
                sim.idle_tick();
            }
            sim.admit_arrived();
            sim.context_switch_to(idx);
            debug!(pid = %sim.proc(idx).pid, "dispatch");
            while !sim.run_tick(idx) {}
        }
    }
}
