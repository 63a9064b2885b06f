//! Gantt timeline recording for the simulator.
//!
//! Every simulated tick appends exactly one [`Slot`] holding a [`Label`]
//! per core: the process that executed, an idle marker, or a context
//! switch. Single-core policies produce one-label slots.

use crate::process::Process;
use crate::types::{CoreId, ProcIdx, Tick};

/// Rendered label for an idle core tick.
pub const IDLE_LABEL: &str = "IDLE";
/// Rendered label for a context-switch tick.
pub const CS_LABEL: &str = "CS";

/// What one core did during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// The process at this table index executed.
    Run(ProcIdx),
    /// No process executed.
    Idle,
    /// Context-switch overhead was charged.
    ContextSwitch,
}

/// One tick of the timeline: a label per core, in core-id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub labels: Vec<Label>,
}

impl Slot {
    /// Whether any core executed a process during this tick.
    pub fn is_busy(&self) -> bool {
        self.labels.iter().any(|l| matches!(l, Label::Run(_)))
    }
}

/// A complete execution timeline in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    slots: Vec<Slot>,
    nr_cores: u32,
    pids: Vec<String>,
}

impl Timeline {
    pub(crate) fn new(nr_cores: u32, procs: &[Process]) -> Self {
        Timeline {
            slots: Vec::new(),
            nr_cores,
            pids: procs.iter().map(|p| p.pid.clone()).collect(),
        }
    }

    /// An empty timeline with no processes attached.
    pub fn empty(nr_cores: u32) -> Self {
        Timeline {
            slots: Vec::new(),
            nr_cores,
            pids: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, labels: Vec<Label>) {
        debug_assert_eq!(labels.len(), self.nr_cores as usize);
        self.slots.push(Slot { labels });
    }

    #[cfg(test)]
    pub(crate) fn record_one(&mut self, label: Label) {
        self.record(vec![label]);
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of recorded ticks.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn nr_cores(&self) -> u32 {
        self.nr_cores
    }

    /// Resolve a label to its display text.
    pub fn label_str(&self, label: Label) -> &str {
        match label {
            Label::Run(idx) => self.pids.get(idx.0).map_or("???", String::as_str),
            Label::Idle => IDLE_LABEL,
            Label::ContextSwitch => CS_LABEL,
        }
    }

    /// Render one slot. Single-core slots render as the bare label; with
    /// several cores the labels are tagged with their core, e.g.
    /// `C0:P1|C1:IDLE`.
    pub fn slot_str(&self, slot: &Slot) -> String {
        if self.nr_cores == 1 {
            return slot
                .labels
                .first()
                .map_or(IDLE_LABEL, |l| self.label_str(*l))
                .to_string();
        }
        slot.labels
            .iter()
            .enumerate()
            .map(|(i, l)| format!("{}:{}", CoreId(i as u32), self.label_str(*l)))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Rendered per-tick labels, one string per slot.
    pub fn labels(&self) -> Vec<String> {
        self.slots.iter().map(|s| self.slot_str(s)).collect()
    }

    /// Labels of a single core, one per tick.
    pub fn core_labels(&self, core: CoreId) -> Vec<&str> {
        self.slots
            .iter()
            .map(|s| {
                s.labels
                    .get(core.0 as usize)
                    .map_or(IDLE_LABEL, |l| self.label_str(*l))
            })
            .collect()
    }

    /// Number of ticks (core-ticks, with several cores) a process executed.
    pub fn executed_ticks(&self, idx: ProcIdx) -> Tick {
        self.slots
            .iter()
            .flat_map(|s| s.labels.iter())
            .filter(|l| **l == Label::Run(idx))
            .count() as Tick
    }

    /// Number of ticks labelled as context switches.
    pub fn context_switch_ticks(&self) -> Tick {
        self.slots
            .iter()
            .flat_map(|s| s.labels.iter())
            .filter(|l| **l == Label::ContextSwitch)
            .count() as Tick
    }

    /// Number of times `idx` was put on a core: runs of consecutive ticks
    /// on the same core count once.
    pub fn dispatch_count(&self, idx: ProcIdx) -> usize {
        let mut count = 0;
        for core in 0..self.nr_cores as usize {
            let mut prev_running = false;
            for slot in &self.slots {
                let running = slot.labels.get(core) == Some(&Label::Run(idx));
                if running && !prev_running {
                    count += 1;
                }
                prev_running = running;
            }
        }
        count
    }

    /// Pretty-print the timeline to stderr for debugging.
    pub fn dump(&self) {
        for (t, slot) in self.slots.iter().enumerate() {
            eprintln!("[{:>6}] {}", t, self.slot_str(slot));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessDef;

    fn procs() -> Vec<Process> {
        vec![
            Process::new(&ProcessDef::new("A", 0, 2, 0)),
            Process::new(&ProcessDef::new("B", 0, 1, 0)),
        ]
    }

    #[test]
    fn test_single_core_labels() {
        let mut tl = Timeline::new(1, &procs());
        tl.record_one(Label::Run(ProcIdx(0)));
        tl.record_one(Label::ContextSwitch);
        tl.record_one(Label::Run(ProcIdx(1)));
        tl.record_one(Label::Idle);
        tl.record_one(Label::Run(ProcIdx(0)));

        assert_eq!(tl.labels(), vec!["A", "CS", "B", "IDLE", "A"]);
        assert_eq!(tl.executed_ticks(ProcIdx(0)), 2);
        assert_eq!(tl.context_switch_ticks(), 1);
        assert_eq!(tl.dispatch_count(ProcIdx(0)), 2);
        assert!(!tl.slots()[3].is_busy());
    }

    #[test]
    fn test_multi_core_slot_rendering() {
        let mut tl = Timeline::new(2, &procs());
        tl.record(vec![Label::Run(ProcIdx(0)), Label::Idle]);
        tl.record(vec![Label::Run(ProcIdx(0)), Label::Run(ProcIdx(1))]);

        assert_eq!(tl.labels(), vec!["C0:A|C1:IDLE", "C0:A|C1:B"]);
        assert_eq!(tl.core_labels(CoreId(1)), vec!["IDLE", "B"]);
        assert_eq!(tl.dispatch_count(ProcIdx(0)), 1);
    }
}
