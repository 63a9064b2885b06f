//! Newtype wrappers and type aliases for domain concepts.
//!
//! Newtypes for identifiers (process table indices, core IDs) prevent
//! silent type confusion between "which process" and "which core". The
//! logical clock is a plain alias: it only ever counts ticks.

use std::fmt;

/// Logical simulation time, in ticks.
pub type Tick = u64;

/// Index of a process in the engine's arrival-sorted process table.
///
/// Ready queues and core assignments carry these handles rather than
/// references, so the table stays the single owner of process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcIdx(pub usize);

/// Simulated core identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CoreId(pub u32);

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}
