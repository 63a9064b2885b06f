//! schedsim - Deterministic tick-driven CPU scheduling simulator.
//!
//! Given a workload of processes (arrival, burst, priority), the simulator
//! runs one scheduling policy to completion on a logical clock and reports
//! per-process timings, a Gantt timeline and run-level metrics.
//!
//! # Architecture
//!
//! - **Engine**: owns the process table and drives one policy per run
//! - **Policies**: FCFS, SJF (preemptive), Priority, RR, MLFQ and
//!   multi-core RR, each a [`SchedPolicy`] over the shared [`Sim`] state
//! - **Timeline**: one slot per tick with a label per core
//! - **I/O oracle**: injectable source of MLFQ I/O blocking decisions
//! - **Reporting**: tables, Gantt charts, CSV and JSON output
//!
//! # Usage
//!
//! ```rust,no_run
//! use schedsim::*;
//!
//! let config = SchedConfig::builder()
//!     .policy(PolicyKind::Rr)
//!     .quantum(2)
//!     .build();
//!
//! let mut engine = Engine::new(default_workload(), config);
//! engine.run();
//! engine.timeline().dump();
//! println!("{:?}", engine.summary());
//! ```

pub mod cpu;
pub mod engine;
pub mod fmt;
pub mod io;
pub mod policy;
pub mod process;
pub mod queue;
pub mod report;
pub mod scenario;
pub mod stats;
pub mod timeline;
pub mod types;
pub mod workload;

pub use engine::{sim_clock, Engine, SchedPolicy, Sim, SimState};
pub use fmt::{FmtTick, SimFormat};
pub use io::{IoOracle, NoIo, ScriptedIo, SeededIo};
pub use process::{ProcState, Process, ProcessDef};
pub use scenario::{
    parse_seed, seed_from_env, IoModel, MlfqConfig, PolicyKind, SchedConfig, SchedConfigBuilder,
    DEFAULT_SEED,
};
pub use stats::{DistributionStats, RunSummary};
pub use timeline::{Label, Slot, Timeline};
pub use types::{CoreId, ProcIdx, Tick};
pub use workload::{default_workload, load_workload, parse_workload};
