#![allow(dead_code)]

use schedsim::{Engine, PolicyKind, ProcessDef, SchedConfig, SimFormat, Tick};

/// Initialize tracing from `RUST_LOG`.
///
/// `try_init()` is idempotent: first call in the process succeeds,
/// subsequent calls are silently ignored.
pub fn setup_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .event_format(SimFormat)
        .with_test_writer()
        .try_init();
}

/// The three-process reference workload: P1(0,5,2) P2(2,3,1) P3(4,1,3).
pub fn reference_workload() -> Vec<ProcessDef> {
    schedsim::default_workload()
}

/// A mixed workload with simultaneous arrivals, an idle gap and a late
/// straggler.
pub fn mixed_workload() -> Vec<ProcessDef> {
    vec![
        ProcessDef::new("A", 0, 4, 3),
        ProcessDef::new("B", 1, 3, 1),
        ProcessDef::new("C", 2, 6, 2),
        ProcessDef::new("D", 3, 1, 4),
        ProcessDef::new("E", 30, 2, 0),
        ProcessDef::new("F", 30, 5, 1),
        ProcessDef::new("G", 45, 3, 2),
    ]
}

/// Run `policy` over `workload` with I/O disabled.
pub fn run(policy: PolicyKind, workload: Vec<ProcessDef>) -> Engine {
    run_with(workload, SchedConfig::builder().policy(policy).no_io().build())
}

pub fn run_with(workload: Vec<ProcessDef>, config: SchedConfig) -> Engine {
    let mut engine = Engine::new(workload, config);
    engine.run();
    engine
}

pub fn completion(engine: &Engine, pid: &str) -> Tick {
    engine
        .process(pid)
        .and_then(|p| p.completion_time)
        .unwrap_or_else(|| panic!("{pid} did not complete"))
}

pub fn start(engine: &Engine, pid: &str) -> Tick {
    engine
        .process(pid)
        .and_then(|p| p.start_time)
        .unwrap_or_else(|| panic!("{pid} never started"))
}

/// Check the invariants every finished run must satisfy.
pub fn assert_run_invariants(engine: &Engine) {
    let timeline = engine.timeline();
    assert_eq!(
        timeline.len() as Tick,
        engine.current_time(),
        "one timeline slot per tick"
    );

    let mut total_burst = 0;
    for (i, p) in engine.processes().iter().enumerate() {
        let idx = schedsim::ProcIdx(i);
        total_burst += p.burst_time;

        assert_eq!(p.remaining_time, 0, "{} did not finish", p.pid);
        assert_eq!(p.state, schedsim::ProcState::Terminated, "{} state", p.pid);
        assert_eq!(
            timeline.executed_ticks(idx),
            p.burst_time,
            "{} executed ticks must equal its burst",
            p.pid
        );

        let start = p.start_time.expect("start time set");
        let completion = p.completion_time.expect("completion time set");
        assert!(start >= p.arrival_time, "{} started before arrival", p.pid);
        assert!(
            completion >= start + p.burst_time,
            "{} completed before running its burst",
            p.pid
        );

        let turnaround = p.turnaround_time.expect("turnaround set");
        let waiting = p.waiting_time.expect("waiting set");
        assert_eq!(turnaround, completion - p.arrival_time);
        assert!(turnaround >= p.burst_time, "{} turnaround below burst", p.pid);
        assert_eq!(waiting, turnaround - p.burst_time);
    }

    assert_eq!(engine.cpu_busy_time(), total_burst, "busy time equals total work");
    let cores = engine.config().effective_cores() as Tick;
    assert!(
        engine.cpu_busy_time() <= cores * engine.current_time(),
        "busy time exceeds capacity"
    );
}

/// Generate a suite of policy-generic tests.
///
/// `$config` is an expression evaluating to a [`SchedConfig`] for the
/// policy under test.
///
/// Usage:
/// ```ignore
/// mod common;
/// policy_property_tests!(SchedConfig::builder().policy(PolicyKind::Rr).no_io().build());
/// ```
#[macro_export]
macro_rules! policy_property_tests {
    ($config:expr) => {
        /// Every process runs exactly its burst and the bookkeeping is consistent.
        #[test]
        fn test_reference_workload_invariants() {
            common::setup_test();
            let engine = common::run_with(common::reference_workload(), $config);
            common::assert_run_invariants(&engine);
        }

        #[test]
        fn test_mixed_workload_invariants() {
            common::setup_test();
            let engine = common::run_with(common::mixed_workload(), $config);
            common::assert_run_invariants(&engine);
        }

        /// Nothing runs before the first arrival.
        #[test]
        fn test_late_first_arrival_idles() {
            common::setup_test();
            let workload = vec![ProcessDef::new("late", 3, 2, 0)];
            let engine = common::run_with(workload, $config);
            common::assert_run_invariants(&engine);
            assert_eq!(common::start(&engine, "late"), 3);
            assert!(engine.timeline().slots()[..3].iter().all(|s| !s.is_busy()));
        }

        /// Running the same engine twice yields identical results.
        #[test]
        fn test_rerun_is_idempotent() {
            common::setup_test();
            let mut engine = Engine::new(common::mixed_workload(), $config);
            engine.run();
            let first_timeline = engine.timeline().clone();
            let first_procs: Vec<_> = engine
                .processes()
                .iter()
                .map(|p| (p.start_time, p.completion_time, p.io_blocks))
                .collect();
            engine.run();
            let second_procs: Vec<_> = engine
                .processes()
                .iter()
                .map(|p| (p.start_time, p.completion_time, p.io_blocks))
                .collect();
            assert_eq!(&first_timeline, engine.timeline());
            assert_eq!(first_procs, second_procs);
        }

        /// An empty workload is a zero-tick run with zero metrics.
        #[test]
        fn test_empty_workload() {
            common::setup_test();
            let engine = common::run_with(Vec::new(), $config);
            assert_eq!(engine.current_time(), 0);
            assert!(engine.timeline().is_empty());
            let summary = engine.summary();
            assert_eq!(summary.process_count, 0);
            assert_eq!(summary.cpu_utilization, 0.0);
            assert_eq!(summary.throughput, 0.0);
        }
    };
}
