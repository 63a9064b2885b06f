//! Workload files.
//!
//! A workload file is plain text. The first line is a header and is
//! ignored; every further non-blank line describes one process:
//!
//! ```text
//! pid arrival burst priority
//! P1  0       5     2
//! P2, 2, 3, 1
//! # comment lines start with '#'
//! ```
//!
//! Fields may be separated by whitespace, commas, or both. Lines that do
//! not describe a valid process are skipped with a warning.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::process::ProcessDef;
use crate::types::Tick;

/// The built-in three-process workload.
pub fn default_workload() -> Vec<ProcessDef> {
    vec![
        ProcessDef::new("P1", 0, 5, 2),
        ProcessDef::new("P2", 2, 3, 1),
        ProcessDef::new("P3", 4, 1, 3),
    ]
}

fn parse_line(line: &str) -> Result<ProcessDef, String> {
    let fields: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .collect();
    let &[pid, arrival, burst, priority] = fields.as_slice() else {
        return Err(format!("expected 4 fields, found {}", fields.len()));
    };
    let arrival: Tick = arrival
        .parse()
        .map_err(|_| format!("invalid arrival time {arrival:?}"))?;
    let burst: Tick = burst
        .parse()
        .map_err(|_| format!("invalid burst time {burst:?}"))?;
    let priority: i32 = priority
        .parse()
        .map_err(|_| format!("invalid priority {priority:?}"))?;
    if burst == 0 {
        return Err("burst time must be positive".to_string());
    }
    Ok(ProcessDef::new(pid, arrival, burst, priority))
}

/// Parse workload text. Never fails: bad lines are skipped.
pub fn parse_workload(text: &str) -> Vec<ProcessDef> {
    let mut defs = Vec::new();
    let mut seen = HashSet::new();

    for (lineno, line) in text.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let def = match parse_line(line) {
            Ok(def) => def,
            Err(e) => {
                warn!(line = lineno + 1, "skipping workload line: {e}");
                continue;
            }
        };
        if !seen.insert(def.pid.clone()) {
            warn!(line = lineno + 1, pid = %def.pid, "skipping duplicate pid");
            continue;
        }
        defs.push(def);
    }

    debug!(processes = defs.len(), "parsed workload");
    defs
}

/// Read and parse a workload file.
pub fn load_workload(path: impl AsRef<Path>) -> Result<Vec<ProcessDef>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read workload {}", path.display()))?;
    Ok(parse_workload(&text))
}
