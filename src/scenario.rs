//! Simulation configuration and builder API.

use std::fmt;

use clap::ValueEnum;
use serde::Serialize;
use tracing::warn;

use crate::io::{IoOracle, NoIo, ScriptedIo, SeededIo};
use crate::types::Tick;

/// Scheduling policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// First-come-first-served, non-preemptive.
    Fcfs,
    /// Shortest remaining time first, preempting every tick.
    Sjf,
    /// Static priority, non-preemptive (lower value runs first).
    Priority,
    /// Round robin on one core.
    Rr,
    /// Three-level feedback queue with aging, boost and simulated I/O.
    #[default]
    Mlfq,
    /// Round robin over several cores sharing one ready queue.
    #[value(name = "rr-mc")]
    RrMc,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 6] = [
        PolicyKind::Fcfs,
        PolicyKind::Sjf,
        PolicyKind::Priority,
        PolicyKind::Rr,
        PolicyKind::Mlfq,
        PolicyKind::RrMc,
    ];

    /// Name used on the command line and in reports.
    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Fcfs => "fcfs",
            PolicyKind::Sjf => "sjf",
            PolicyKind::Priority => "priority",
            PolicyKind::Rr => "rr",
            PolicyKind::Mlfq => "mlfq",
            PolicyKind::RrMc => "rr-mc",
        }
    }

    /// Whether the policy drives more than one core.
    pub fn is_multicore(self) -> bool {
        self == PolicyKind::RrMc
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of MLFQ levels.
pub const MLFQ_LEVELS: usize = 3;

/// MLFQ tuning knobs.
///
/// The defaults (quanta 2/4/unbounded, aging after 5 waiting ticks, boost
/// every 20 ticks, 3-tick I/O) are implementation-defined, not tuned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MlfqConfig {
    /// Quantum per level, highest level first. `None` runs the slice until
    /// the process finishes.
    pub quanta: [Option<Tick>; MLFQ_LEVELS],
    /// A ready process is promoted once its wait counter exceeds this.
    /// `None` disables aging.
    pub aging_threshold: Option<Tick>,
    /// Every this many ticks all demoted processes return to the top level.
    /// `None` disables the boost.
    pub boost_interval: Option<Tick>,
    /// Length of one simulated I/O wait.
    pub io_duration: Tick,
}

impl Default for MlfqConfig {
    fn default() -> Self {
        MlfqConfig {
            quanta: [Some(2), Some(4), None],
            aging_threshold: Some(5),
            boost_interval: Some(20),
            io_duration: 3,
        }
    }
}

impl MlfqConfig {
    /// Quantum for a 1-based level.
    pub fn quantum(&self, level: u8) -> Option<Tick> {
        let i = (level.max(1) as usize - 1).min(MLFQ_LEVELS - 1);
        self.quanta[i]
    }
}

/// Default chance of an I/O block per MLFQ dispatch: one in this many.
pub const DEFAULT_IO_ONE_IN: u32 = 20;

/// Source of MLFQ I/O decisions. A fresh oracle is built for every run so
/// repeated runs replay the same stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IoModel {
    /// Seeded PRNG, blocking with probability `1 / one_in`.
    Random { seed: u64, one_in: u32 },
    /// Replay these decisions, then never block.
    Scripted(Vec<bool>),
    /// Never block.
    Disabled,
}

impl Default for IoModel {
    fn default() -> Self {
        IoModel::Random {
            seed: DEFAULT_SEED,
            one_in: DEFAULT_IO_ONE_IN,
        }
    }
}

impl IoModel {
    pub fn oracle(&self) -> Box<dyn IoOracle> {
        match self {
            IoModel::Random { seed, one_in } => Box::new(SeededIo::new(*seed, *one_in)),
            IoModel::Scripted(decisions) => Box::new(ScriptedIo::new(decisions.iter().copied())),
            IoModel::Disabled => Box::new(NoIo),
        }
    }
}

/// Default PRNG seed used when no seed is specified.
pub const DEFAULT_SEED: u64 = 42;

/// Parse a seed string: a `u64` integer or `"entropy"` for OS randomness.
///
/// Returns `DEFAULT_SEED` (42) for `None` or empty strings.
pub fn parse_seed(s: Option<&str>) -> Result<u64, String> {
    match s {
        None | Some("") => Ok(DEFAULT_SEED),
        Some(s) if s.eq_ignore_ascii_case("entropy") => {
            let seed: u64 = rand::random();
            warn!(
                seed,
                "seed=entropy: seeding I/O model with OS randomness \
                 (set seed={seed} to reproduce this run)"
            );
            Ok(seed)
        }
        Some(s) => s
            .parse::<u64>()
            .map_err(|_| format!("seed={s:?}: expected a u64 integer or \"entropy\"")),
    }
}

/// Resolve the PRNG seed from the `SCHEDSIM_SEED` environment variable,
/// falling back to `DEFAULT_SEED` when unset or unparsable.
pub fn seed_from_env() -> u64 {
    let var = std::env::var("SCHEDSIM_SEED").ok();
    parse_seed(var.as_deref()).unwrap_or_else(|e| {
        warn!("{e}; using default seed {DEFAULT_SEED}");
        DEFAULT_SEED
    })
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedConfig {
    pub policy: PolicyKind,
    /// Round-robin quantum in ticks. Always positive.
    pub quantum: Tick,
    /// Ticks charged when a single core switches to a different process.
    pub context_switch: Tick,
    /// Number of cores. Always at least 1; only `rr-mc` uses more than one.
    pub nr_cores: u32,
    pub mlfq: MlfqConfig,
    pub io: IoModel,
}

impl SchedConfig {
    pub fn builder() -> SchedConfigBuilder {
        SchedConfigBuilder {
            policy: PolicyKind::default(),
            quantum: 2,
            context_switch: 0,
            nr_cores: 1,
            mlfq: MlfqConfig::default(),
            io: IoModel::Random {
                seed: seed_from_env(),
                one_in: DEFAULT_IO_ONE_IN,
            },
        }
    }

    /// Cores the configured policy actually drives.
    pub fn effective_cores(&self) -> u32 {
        if self.policy.is_multicore() {
            self.nr_cores
        } else {
            1
        }
    }
}

/// Builder for constructing configurations.
pub struct SchedConfigBuilder {
    policy: PolicyKind,
    quantum: Tick,
    context_switch: Tick,
    nr_cores: u32,
    mlfq: MlfqConfig,
    io: IoModel,
}

impl SchedConfigBuilder {
    pub fn policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Set the round-robin quantum. Must be positive.
    pub fn quantum(mut self, quantum: Tick) -> Self {
        self.quantum = quantum;
        self
    }

    pub fn context_switch(mut self, ticks: Tick) -> Self {
        self.context_switch = ticks;
        self
    }

    /// Set the number of cores. Zero is clamped to one.
    pub fn cores(mut self, n: u32) -> Self {
        self.nr_cores = n.max(1);
        self
    }

    pub fn mlfq(mut self, mlfq: MlfqConfig) -> Self {
        self.mlfq = mlfq;
        self
    }

    pub fn aging_threshold(mut self, threshold: Option<Tick>) -> Self {
        self.mlfq.aging_threshold = threshold;
        self
    }

    pub fn boost_interval(mut self, interval: Option<Tick>) -> Self {
        self.mlfq.boost_interval = interval;
        self
    }

    pub fn io(mut self, io: IoModel) -> Self {
        self.io = io;
        self
    }

    /// Disable simulated I/O.
    pub fn no_io(self) -> Self {
        self.io(IoModel::Disabled)
    }

    /// # Panics
    /// Panics if the quantum, any MLFQ quantum or the boost interval is zero.
    pub fn build(self) -> SchedConfig {
        assert!(self.quantum > 0, "quantum must be positive");
        assert!(
            self.mlfq.quanta.iter().flatten().all(|&q| q > 0),
            "MLFQ quanta must be positive"
        );
        assert!(
            self.mlfq.boost_interval != Some(0),
            "boost interval must be positive"
        );
        SchedConfig {
            policy: self.policy,
            quantum: self.quantum,
            context_switch: self.context_switch,
            nr_cores: self.nr_cores,
            mlfq: self.mlfq,
            io: self.io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let cfg = SchedConfig::builder().build();
        assert_eq!(cfg.policy, PolicyKind::Mlfq);
        assert_eq!(cfg.quantum, 2);
        assert_eq!(cfg.context_switch, 0);
        assert_eq!(cfg.nr_cores, 1);
        assert_eq!(cfg.mlfq, MlfqConfig::default());
    }

    #[test]
    fn test_builder_clamps_cores() {
        let cfg = SchedConfig::builder().cores(0).build();
        assert_eq!(cfg.nr_cores, 1);
    }

    #[test]
    fn test_effective_cores_single_core_policies() {
        let cfg = SchedConfig::builder().policy(PolicyKind::Rr).cores(4).build();
        assert_eq!(cfg.effective_cores(), 1);
        let cfg = SchedConfig::builder().policy(PolicyKind::RrMc).cores(4).build();
        assert_eq!(cfg.effective_cores(), 4);
    }

    #[test]
    #[should_panic(expected = "quantum must be positive")]
    fn test_builder_rejects_zero_quantum() {
        SchedConfig::builder().quantum(0).build();
    }

    #[test]
    fn test_mlfq_quantum_per_level() {
        let m = MlfqConfig::default();
        assert_eq!(m.quantum(1), Some(2));
        assert_eq!(m.quantum(2), Some(4));
        assert_eq!(m.quantum(3), None);
    }

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed(None), Ok(DEFAULT_SEED));
        assert_eq!(parse_seed(Some("")), Ok(DEFAULT_SEED));
        assert_eq!(parse_seed(Some("1234")), Ok(1234));
        assert!(parse_seed(Some("nope")).is_err());
        assert!(parse_seed(Some("ENTROPY")).is_ok());
    }

    #[test]
    fn test_policy_names_round_trip_through_clap() {
        for kind in PolicyKind::ALL {
            assert_eq!(PolicyKind::from_str(kind.name(), false), Ok(kind));
        }
        assert!(PolicyKind::from_str("lottery", false).is_err());
    }
}
