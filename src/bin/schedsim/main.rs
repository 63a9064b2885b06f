//! schedsim: run a CPU scheduling policy over a workload and report.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use schedsim::report;
use schedsim::scenario::{parse_seed, IoModel};
use schedsim::{default_workload, load_workload, Engine, PolicyKind, ProcessDef, SchedConfig, SimFormat};

/// Simulate CPU scheduling policies on a workload.
#[derive(Parser)]
#[command(name = "schedsim", allow_negative_numbers = true)]
struct Cli {
    /// Scheduling policy.
    #[arg(value_enum, default_value_t = PolicyKind::Mlfq)]
    algorithm: PolicyKind,

    /// Workload file (`pid arrival burst priority` per line, after a
    /// header line). Falls back to a built-in workload when missing,
    /// unreadable or empty.
    workload: Option<PathBuf>,

    /// Number of cores. Only `rr-mc` uses more than one; values below 1
    /// are treated as 1.
    #[arg(default_value_t = 1)]
    cores: i64,

    /// Round-robin quantum in ticks.
    #[arg(short, long, default_value_t = 2, env = "SCHEDSIM_QUANTUM",
          value_parser = clap::value_parser!(u64).range(1..))]
    quantum: u64,

    /// Ticks charged when a single-core policy switches to a different process.
    #[arg(long, default_value_t = 0, env = "SCHEDSIM_CONTEXT_SWITCH")]
    context_switch: u64,

    /// PRNG seed for MLFQ I/O (u64 integer or "entropy" for OS randomness).
    ///
    /// Falls back to SCHEDSIM_SEED env var, then default (42).
    #[arg(long, env = "SCHEDSIM_SEED")]
    seed: Option<String>,

    /// MLFQ dispatches block on I/O with probability 1/N. 0 disables I/O.
    #[arg(long, value_name = "N", env = "SCHEDSIM_IO_CHANCE",
          default_value_t = schedsim::scenario::DEFAULT_IO_ONE_IN)]
    io_chance: u32,

    /// MLFQ aging threshold in ticks. 0 disables aging.
    #[arg(long, value_name = "TICKS", env = "SCHEDSIM_AGING_THRESHOLD")]
    aging_threshold: Option<u64>,

    /// MLFQ priority boost interval in ticks. 0 disables the boost.
    #[arg(long, value_name = "TICKS", env = "SCHEDSIM_BOOST_INTERVAL")]
    boost_interval: Option<u64>,

    /// Export the Gantt timeline as `time,label` CSV.
    #[arg(long, value_name = "PATH")]
    gantt_csv: Option<PathBuf>,

    /// Append a row to a cumulative performance CSV.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Print a JSON report instead of tables.
    #[arg(long)]
    json: bool,

    /// Disable ANSI colors in the Gantt chart.
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn resolve_workload(path: Option<&PathBuf>) -> Vec<ProcessDef> {
    let Some(path) = path else {
        return default_workload();
    };
    match load_workload(path) {
        Ok(defs) if !defs.is_empty() => {
            info!(path = %path.display(), processes = defs.len(), "loaded workload");
            defs
        }
        Ok(_) => {
            warn!(path = %path.display(), "workload has no processes, using built-in workload");
            default_workload()
        }
        Err(e) => {
            warn!("{e:#}; using built-in workload");
            default_workload()
        }
    }
}

fn build_config(cli: &Cli) -> Result<SchedConfig> {
    let seed = parse_seed(cli.seed.as_deref()).map_err(|e| anyhow!(e))?;
    let io = if cli.io_chance == 0 {
        IoModel::Disabled
    } else {
        IoModel::Random {
            seed,
            one_in: cli.io_chance,
        }
    };
    let cores = u32::try_from(cli.cores.max(1)).unwrap_or(u32::MAX);

    let mut builder = SchedConfig::builder()
        .policy(cli.algorithm)
        .quantum(cli.quantum)
        .context_switch(cli.context_switch)
        .cores(cores)
        .io(io);
    if let Some(t) = cli.aging_threshold {
        builder = builder.aging_threshold((t > 0).then_some(t));
    }
    if let Some(t) = cli.boost_interval {
        builder = builder.boost_interval((t > 0).then_some(t));
    }
    Ok(builder.build())
}

fn run(cli: &Cli) -> Result<()> {
    let config = build_config(cli)?;
    if cli.cores > 1 && !cli.algorithm.is_multicore() {
        warn!(
            algorithm = %cli.algorithm,
            cores = cli.cores,
            "policy is single-core, extra cores are ignored"
        );
    }

    let workload = resolve_workload(cli.workload.as_ref());
    let mut engine = Engine::new(workload, config);
    engine.run();
    let summary = engine.summary();

    let stdout = std::io::stdout();
    let color = !cli.no_color && stdout.is_terminal();
    let mut out = stdout.lock();

    if cli.json {
        report::write_json(&mut out, &engine)?;
    } else {
        writeln!(out, "\n===== {} RESULTS =====", cli.algorithm.name().to_uppercase())?;
        report::write_table(&mut out, engine.processes())?;
        writeln!(out, "\n===== GANTT CHART =====")?;
        report::write_gantt(&mut out, engine.timeline(), color)?;
        writeln!(out, "\n===== SYSTEM METRICS =====")?;
        report::write_metrics(&mut out, &summary)?;
    }

    if let Some(path) = &cli.gantt_csv {
        report::export_gantt_csv(path, engine.timeline())?;
        info!(path = %path.display(), "exported Gantt CSV");
    }
    if let Some(path) = &cli.report {
        report::append_performance_row(path, &summary)?;
        info!(path = %path.display(), "appended performance row");
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(SimFormat)
        .try_init();
}
