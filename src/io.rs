//! Simulated I/O blocking decisions.
//!
//! MLFQ asks an [`IoOracle`] on every dispatch whether the process blocks on
//! I/O instead of running. The oracle is injected, never global, so a run is
//! reproducible from its seed and tests can script exact outcomes.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Decides whether a dispatched process blocks on simulated I/O.
pub trait IoOracle {
    fn blocks_on_dispatch(&mut self) -> bool;
}

/// Never blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIo;

impl IoOracle for NoIo {
    fn blocks_on_dispatch(&mut self) -> bool {
        false
    }
}

/// Blocks with probability `1 / one_in`, drawn from a seeded PRNG.
///
/// `one_in == 0` disables blocking entirely.
#[derive(Debug, Clone)]
pub struct SeededIo {
    rng: SmallRng,
    one_in: u32,
}

impl SeededIo {
    pub fn new(seed: u64, one_in: u32) -> Self {
        SeededIo {
            rng: SmallRng::seed_from_u64(seed),
            one_in,
        }
    }
}

impl IoOracle for SeededIo {
    fn blocks_on_dispatch(&mut self) -> bool {
        if self.one_in == 0 {
            return false;
        }
        self.rng.next_u32() % self.one_in == 0
    }
}

/// Replays a fixed sequence of decisions, then never blocks.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIo {
    decisions: VecDeque<bool>,
}

impl ScriptedIo {
    pub fn new(decisions: impl IntoIterator<Item = bool>) -> Self {
        ScriptedIo {
            decisions: decisions.into_iter().collect(),
        }
    }

    /// Decisions not consumed yet.
    pub fn remaining(&self) -> usize {
        self.decisions.len()
    }
}

impl IoOracle for ScriptedIo {
    fn blocks_on_dispatch(&mut self) -> bool {
        self.decisions.pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_io_is_reproducible() {
        let mut a = SeededIo::new(7, 3);
        let mut b = SeededIo::new(7, 3);
        let xs: Vec<bool> = (0..64).map(|_| a.blocks_on_dispatch()).collect();
        let ys: Vec<bool> = (0..64).map(|_| b.blocks_on_dispatch()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().any(|&x| x), "1-in-3 over 64 draws never blocked");
    }

    #[test]
    fn test_seeded_io_zero_chance_never_blocks() {
        let mut io = SeededIo::new(42, 0);
        assert!((0..100).all(|_| !io.blocks_on_dispatch()));
    }

    #[test]
    fn test_seeded_io_one_in_one_always_blocks() {
        let mut io = SeededIo::new(42, 1);
        assert!((0..100).all(|_| io.blocks_on_dispatch()));
    }

    #[test]
    fn test_scripted_io_replays_then_stops() {
        let mut io = ScriptedIo::new([true, false, true]);
        assert!(io.blocks_on_dispatch());
        assert!(!io.blocks_on_dispatch());
        assert!(io.blocks_on_dispatch());
        assert_eq!(io.remaining(), 0);
        assert!(!io.blocks_on_dispatch());
    }
}
