//! Round robin over several cores sharing one ready queue.

use tracing::debug;

use crate::cpu::SimCore;
use crate::engine::{SchedPolicy, Sim};
use crate::process::ProcState;
use crate::queue::{Arrivals, ReadyQueue};
use crate::scenario::PolicyKind;
use crate::timeline::Label;
use crate::types::{CoreId, Tick};

/// Every tick, idle cores (in id order) take the head of the shared queue
/// and every busy core runs its process for one tick. A core freed by
/// completion or quantum expiry is refilled on the next tick.
#[derive(Debug)]
pub struct MultiCoreRoundRobin {
    quantum: Tick,
    nr_cores: u32,
}

impl MultiCoreRoundRobin {
    pub fn new(quantum: Tick, nr_cores: u32) -> Self {
        assert!(quantum > 0, "quantum must be positive");
        MultiCoreRoundRobin {
            quantum,
            nr_cores: nr_cores.max(1),
        }
    }
}

impl SchedPolicy for MultiCoreRoundRobin {
    fn kind(&self) -> PolicyKind {
        PolicyKind::RrMc
    }

    fn simulate(&mut self, sim: &mut Sim<'_>) {
        let mut cores: Vec<SimCore> = (0..self.nr_cores).map(|i| SimCore::new(CoreId(i))).collect();
        let mut queue = ReadyQueue::new();
        let mut arrivals = Arrivals::new();

        while !sim.all_done() {
            arrivals.admit(sim, &mut queue);

            for core in cores.iter_mut().filter(|c| c.is_idle()) {
                let Some(idx) = queue.pop() else {
                    break;
                };
                debug!(pid = %sim.proc(idx).pid, core = %core.id, "dispatch");
                core.assign(idx);
            }

            let mut labels = Vec::with_capacity(cores.len());
            let mut expired = Vec::new();
            for core in &mut cores {
                let Some(idx) = core.running else {
                    labels.push(Label::Idle);
                    continue;
                };
                labels.push(Label::Run(idx));
                let done = sim.execute(idx);
                core.slice_used += 1;
                if done {
                    core.release();
                } else if core.slice_used >= self.quantum {
                    debug!(pid = %sim.proc(idx).pid, core = %core.id, "quantum expired");
                    core.release();
                    expired.push(idx);
                }
            }
            sim.advance(labels);

            // Processes arriving by the end of this tick queue ahead of the
            // ones just preempted.
            arrivals.admit(sim, &mut queue);
            for idx in expired {
                sim.proc_mut(idx).state = ProcState::Ready;
                queue.push(idx);
            }
        }
    }
}
