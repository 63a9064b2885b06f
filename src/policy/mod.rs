//! Scheduling policies.
//!
//! Each policy implements [`SchedPolicy`] over the shared [`Sim`] state and
//! is selected by [`build`] from the configured [`PolicyKind`].
//!
//! [`Sim`]: crate::engine::Sim

mod fcfs;
mod mlfq;
mod priority;
mod rr;
mod rr_multicore;
mod sjf;

pub use fcfs::Fcfs;
pub use mlfq::Mlfq;
pub use priority::Priority;
pub use rr::RoundRobin;
pub use rr_multicore::MultiCoreRoundRobin;
pub use sjf::ShortestRemaining;

use crate::engine::SchedPolicy;
use crate::scenario::{PolicyKind, SchedConfig};

/// Build the policy selected by `config`.
pub fn build(config: &SchedConfig) -> Box<dyn SchedPolicy> {
    match config.policy {
        PolicyKind::Fcfs => Box::new(Fcfs),
        PolicyKind::Sjf => Box::new(ShortestRemaining),
        PolicyKind::Priority => Box::new(Priority),
        PolicyKind::Rr => Box::new(RoundRobin::new(config.quantum)),
        PolicyKind::Mlfq => Box::new(Mlfq::new(config.mlfq.clone())),
        PolicyKind::RrMc => Box::new(MultiCoreRoundRobin::new(config.quantum, config.nr_cores)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_requested_policy() {
        for kind in PolicyKind::ALL {
            let cfg = SchedConfig::builder().policy(kind).build();
            assert_eq!(build(&cfg).kind(), kind);
        }
    }
}
