//! Human- and machine-readable output of a finished run.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::engine::Engine;
use crate::process::Process;
use crate::scenario::SchedConfig;
use crate::stats::RunSummary;
use crate::timeline::{Timeline, CS_LABEL, IDLE_LABEL};
use crate::types::CoreId;

const RESET: &str = "\x1b[0m";
const GREY: &str = "\x1b[90m";
const WHITE: &str = "\x1b[37m";
const PID_COLORS: [&str; 6] = [
    "\x1b[31m", "\x1b[32m", "\x1b[33m", "\x1b[34m", "\x1b[35m", "\x1b[36m",
];

/// Header of the cumulative performance CSV.
pub const PERFORMANCE_HEADER: &str =
    "algorithm,cores,avg_waiting_time,avg_turnaround_time,cpu_utilization,throughput";

/// ANSI color for a Gantt label. Process colors are keyed by a hash of the
/// pid so a process keeps its color across runs.
pub fn label_color(label: &str) -> &'static str {
    match label {
        IDLE_LABEL => GREY,
        CS_LABEL => WHITE,
        pid => {
            let hash = pid.bytes().fold(0usize, |h, b| (h + b as usize) % PID_COLORS.len());
            PID_COLORS[hash]
        }
    }
}

fn opt(v: Option<u64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Per-process results table followed by the averages.
pub fn write_table<W: Write>(w: &mut W, procs: &[Process]) -> Result<()> {
    let pid_w = procs.iter().map(|p| p.pid.len()).max().unwrap_or(0).max(3);
    writeln!(
        w,
        "{:<pid_w$}  {:>4}  {:>4}  {:>4}  {:>4}  {:>4}  {:>4}",
        "PID", "AT", "BT", "ST", "CT", "WT", "TAT"
    )?;
    writeln!(w, "{}", "-".repeat(pid_w + 36))?;
    for p in procs {
        writeln!(
            w,
            "{:<pid_w$}  {:>4}  {:>4}  {:>4}  {:>4}  {:>4}  {:>4}",
            p.pid,
            p.arrival_time,
            p.burst_time,
            opt(p.start_time),
            opt(p.completion_time),
            opt(p.waiting_time),
            opt(p.turnaround_time),
        )?;
    }
    writeln!(w, "{}", "-".repeat(pid_w + 36))?;

    let n = procs.len().max(1) as f64;
    let total_wt: u64 = procs.iter().filter_map(|p| p.waiting_time).sum();
    let total_tat: u64 = procs.iter().filter_map(|p| p.turnaround_time).sum();
    writeln!(w, "Avg WT : {:.2}", total_wt as f64 / n)?;
    writeln!(w, "Avg TAT: {:.2}", total_tat as f64 / n)?;
    Ok(())
}

fn write_bar<W: Write>(w: &mut W, labels: &[&str], width: usize, color: bool) -> Result<()> {
    let border = "-".repeat(labels.len() * (width + 3) + 1);
    writeln!(w, "{border}")?;
    write!(w, "|")?;
    for label in labels {
        let pad = " ".repeat(width - label.len());
        if color {
            write!(w, " {}{label}{RESET}{pad} |", label_color(label))?;
        } else {
            write!(w, " {label}{pad} |")?;
        }
    }
    writeln!(w)?;
    writeln!(w, "{border}")?;
    write!(w, "0")?;
    for t in 1..=labels.len() {
        write!(w, "{t:>cell$}", cell = width + 3)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Gantt chart of the timeline, one bar per core.
pub fn write_gantt<W: Write>(w: &mut W, timeline: &Timeline, color: bool) -> Result<()> {
    if timeline.is_empty() {
        writeln!(w, "(empty timeline)")?;
        return Ok(());
    }
    for core in 0..timeline.nr_cores() {
        let core = CoreId(core);
        let labels = timeline.core_labels(core);
        let width = labels.iter().map(|l| l.len()).max().unwrap_or(0).max(2);
        if timeline.nr_cores() > 1 {
            writeln!(w, "{core}:")?;
        }
        write_bar(w, &labels, width, color)?;
    }
    Ok(())
}

/// Gantt timeline as a `time,label` CSV, one row per tick.
pub fn write_gantt_csv<W: Write>(w: &mut W, timeline: &Timeline) -> Result<()> {
    writeln!(w, "time,label")?;
    for (t, slot) in timeline.slots().iter().enumerate() {
        writeln!(w, "{t},{}", timeline.slot_str(slot))?;
    }
    Ok(())
}

pub fn export_gantt_csv(path: impl AsRef<Path>, timeline: &Timeline) -> Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_gantt_csv(&mut file, timeline)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Run-level system metrics.
pub fn write_metrics<W: Write>(w: &mut W, summary: &RunSummary) -> Result<()> {
    writeln!(w, "Algorithm      : {}", summary.algorithm)?;
    writeln!(w, "Cores          : {}", summary.cores)?;
    writeln!(w, "Total Time     : {}", summary.total_time)?;
    writeln!(w, "CPU Busy Time  : {}", summary.cpu_busy_time)?;
    writeln!(w, "CPU Utilization: {:.2}%", summary.cpu_utilization)?;
    writeln!(w, "Throughput     : {:.4} processes/tick", summary.throughput)?;
    if summary.process_count > 0 {
        writeln!(
            w,
            "Waiting        : min {} max {} stddev {:.2}",
            summary.waiting.min,
            summary.waiting.max,
            summary.waiting.stddev
        )?;
        writeln!(
            w,
            "Turnaround     : min {} max {} stddev {:.2}",
            summary.turnaround.min,
            summary.turnaround.max,
            summary.turnaround.stddev
        )?;
    }
    Ok(())
}

/// One row of the cumulative performance CSV.
pub fn performance_row(summary: &RunSummary) -> String {
    format!(
        "{},{},{:.2},{:.2},{:.2},{:.4}",
        summary.algorithm,
        summary.cores,
        summary.avg_waiting_time,
        summary.avg_turnaround_time,
        summary.cpu_utilization,
        summary.throughput
    )
}

/// Append a run to the cumulative performance CSV at `path`, creating it
/// if needed. The header is written only when the file is empty.
pub fn append_performance_row(path: impl AsRef<Path>, summary: &RunSummary) -> Result<()> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();
    if len == 0 {
        writeln!(file, "{PERFORMANCE_HEADER}")?;
    }
    writeln!(file, "{}", performance_row(summary))
        .with_context(|| format!("failed to append to {}", path.display()))?;
    Ok(())
}

/// Everything about one run, for `--json`.
#[derive(Serialize)]
pub struct RunReport<'a> {
    pub config: &'a SchedConfig,
    pub summary: RunSummary,
    pub processes: &'a [Process],
    pub timeline: Vec<String>,
}

impl<'a> RunReport<'a> {
    pub fn new(engine: &'a Engine) -> Self {
        RunReport {
            config: engine.config(),
            summary: engine.summary(),
            processes: engine.processes(),
            timeline: engine.timeline().labels(),
        }
    }
}

pub fn write_json<W: Write>(w: &mut W, engine: &Engine) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, &RunReport::new(engine))
        .context("failed to serialize run report")?;
    writeln!(w)?;
    Ok(())
}
