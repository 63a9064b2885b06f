//! Static priority, non-preemptive.

use tracing::debug;

use crate::engine::{SchedPolicy, Sim};
use crate::scenario::PolicyKind;

/// Picks the lowest priority value among arrived processes and runs it to
/// completion. There is no aging: a low-priority process starves while
/// higher-priority work keeps arriving.
#[derive(Debug, Default)]
pub struct Priority;

impl SchedPolicy for Priority {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Priority
    }

    fn simulate(&mut self, sim: &mut Sim<'_>) {
        while !sim.all_done() {
            sim.admit_arrived();
            let pick = sim
                .eligible()
                .into_iter()
                .min_by_key(|&idx| (sim.proc(idx).priority, idx));
            let Some(idx) = pick else {
                sim.idle_tick();
                continue;
            };
            sim.context_switch_to(idx);
            debug!(pid = %sim.proc(idx).pid, priority = sim.proc(idx).priority, "dispatch");
            while !sim.run_tick(idx) {}
        }
    }
}
