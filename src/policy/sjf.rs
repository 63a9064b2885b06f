//! Shortest-job-first, preemptive: shortest remaining time wins every tick.

use crate::engine::{SchedPolicy, Sim};
use crate::process::ProcState;
use crate::scenario::PolicyKind;

/// Re-evaluates the choice every tick; ties go to the lower table index.
/// Switching to a different process, preemption included, costs the
/// configured context-switch ticks.
#[derive(Debug, Default)]
pub struct ShortestRemaining;

impl SchedPolicy for ShortestRemaining {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Sjf
    }

    fn simulate(&mut self, sim: &mut Sim<'_>) {
        while !sim.all_done() {
            sim.admit_arrived();
            let pick = sim
                .eligible()
                .into_iter()
                .min_by_key(|&idx| (sim.proc(idx).remaining_time, idx));
            match pick {
                Some(idx) => {
                    sim.context_switch_to(idx);
                    sim.run_tick(idx);
                    if !sim.proc(idx).is_done() {
                        sim.proc_mut(idx).state = ProcState::Ready;
                    }
                }
                None => sim.idle_tick(),
            }
        }
    }
}
