//! Aggregate metrics of a finished run.
//!
//! [`RunSummary`] is what reports, the JSON output and the cumulative
//! performance CSV are built from. Every ratio is zero-safe: an empty
//! workload yields a zero-tick run and all metrics are zero.

use serde::Serialize;

use crate::process::Process;
use crate::scenario::PolicyKind;
use crate::types::Tick;

/// Spread of a per-process metric over the finished processes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionStats {
    pub count: usize,
    pub min: Tick,
    pub max: Tick,
    pub mean: f64,
    /// Population standard deviation.
    pub stddev: f64,
}

impl DistributionStats {
    /// All zero for an empty sample.
    pub fn from_samples(samples: &[Tick]) -> Self {
        let (Some(&min), Some(&max)) = (samples.iter().min(), samples.iter().max()) else {
            return Self::default();
        };
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<Tick>() as f64 / n;
        let variance = samples
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        DistributionStats {
            count: samples.len(),
            min,
            max,
            mean,
            stddev: variance.sqrt(),
        }
    }
}

/// Run-level metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub algorithm: PolicyKind,
    pub cores: u32,
    pub process_count: usize,
    /// Length of the run in ticks.
    pub total_time: Tick,
    /// Core-ticks that executed a process.
    pub cpu_busy_time: Tick,
    /// `cpu_busy_time / (cores × total_time) × 100`.
    pub cpu_utilization: f64,
    /// Completed processes per tick.
    pub throughput: f64,
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub waiting: DistributionStats,
    pub turnaround: DistributionStats,
}

impl RunSummary {
    pub fn new(
        algorithm: PolicyKind,
        cores: u32,
        procs: &[Process],
        total_time: Tick,
        cpu_busy_time: Tick,
    ) -> Self {
        let cores = cores.max(1);
        let waiting: Vec<Tick> = procs.iter().filter_map(|p| p.waiting_time).collect();
        let turnaround: Vec<Tick> = procs.iter().filter_map(|p| p.turnaround_time).collect();
        let waiting = DistributionStats::from_samples(&waiting);
        let turnaround = DistributionStats::from_samples(&turnaround);

        let (cpu_utilization, throughput) = if total_time == 0 {
            (0.0, 0.0)
        } else {
            let capacity = (cores as u64 * total_time) as f64;
            (
                cpu_busy_time as f64 / capacity * 100.0,
                procs.len() as f64 / total_time as f64,
            )
        };

        RunSummary {
            algorithm,
            cores,
            process_count: procs.len(),
            total_time,
            cpu_busy_time,
            cpu_utilization,
            throughput,
            avg_waiting_time: waiting.mean,
            avg_turnaround_time: turnaround.mean,
            waiting,
            turnaround,
        }
    }
}
