//! Single-core round robin.

use tracing::debug;

use crate::engine::{SchedPolicy, Sim};
use crate::process::ProcState;
use crate::queue::{Arrivals, ReadyQueue};
use crate::scenario::PolicyKind;
use crate::types::Tick;

/// FIFO ready queue; each dispatch runs for at most one quantum.
#[derive(Debug)]
pub struct RoundRobin {
    quantum: Tick,
}

impl RoundRobin {
    pub fn new(quantum: Tick) -> Self {
        assert!(quantum > 0, "quantum must be positive");
        RoundRobin { quantum }
    }
}

impl SchedPolicy for RoundRobin {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Rr
    }

    fn simulate(&mut self, sim: &mut Sim<'_>) {
        let mut queue = ReadyQueue::new();
        let mut arrivals = Arrivals::new();
        arrivals.admit(sim, &mut queue);

        while !sim.all_done() {
            let Some(idx) = queue.pop() else {
                sim.idle_tick();
                arrivals.admit(sim, &mut queue);
                continue;
            };

            sim.context_switch_to(idx);
            arrivals.admit(sim, &mut queue);

            let mut used = 0;
            let mut done = false;
            while used < self.quantum && !done {
                done = sim.run_tick(idx);
                used += 1;
                // Arrivals during the slice queue ahead of the preempted process.
                arrivals.admit(sim, &mut queue);
            }

            if !done {
                debug!(pid = %sim.proc(idx).pid, remaining = sim.proc(idx).remaining_time, "quantum expired");
                sim.proc_mut(idx).state = ProcState::Ready;
                queue.push(idx);
            }
        }
    }
}
