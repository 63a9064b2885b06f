//! Workload files and report outputs on disk.

use std::io::Write;

use schedsim::report;
use schedsim::*;
use tempfile::{NamedTempFile, TempDir};

mod common;

fn write_workload(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_workload_file_and_run() {
    common::setup_test();
    let file = write_workload(
        "pid arrival burst priority\n\
         P1 0 5 2\n\
         # P9 is disabled\n\
         P2,2,3,1\n\
         P3 4 1 3\n",
    );
    let workload = load_workload(file.path()).unwrap();
    assert_eq!(workload, default_workload());

    let engine = common::run(PolicyKind::Fcfs, workload);
    assert_eq!(common::completion(&engine, "P3"), 9);
}

#[test]
fn test_gantt_csv_export() {
    common::setup_test();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gantt.csv");

    let engine = common::run(PolicyKind::Rr, default_workload());
    report::export_gantt_csv(&path, engine.timeline()).unwrap();

    let csv = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "time,label");
    assert_eq!(lines.len(), 1 + engine.timeline().len());
    assert_eq!(lines[1], "0,P1");
    assert_eq!(lines[3], "2,P2");
    assert_eq!(lines[9], "8,P1");
}

#[test]
fn test_multicore_gantt_csv_rows() {
    common::setup_test();
    let config = SchedConfig::builder()
        .policy(PolicyKind::RrMc)
        .cores(2)
        .no_io()
        .build();
    let engine = common::run_with(default_workload(), config);

    let mut out = Vec::new();
    report::write_gantt_csv(&mut out, engine.timeline()).unwrap();
    let csv = String::from_utf8(out).unwrap();
    assert!(csv.starts_with("time,label\n0,C0:P1|C1:IDLE\n"));
}

#[test]
fn test_performance_report_header_written_once() {
    common::setup_test();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("performance.csv");

    for policy in [PolicyKind::Fcfs, PolicyKind::Rr] {
        let engine = common::run(policy, default_workload());
        report::append_performance_row(&path, &engine.summary()).unwrap();
    }

    let csv = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], report::PERFORMANCE_HEADER);
    assert_eq!(lines[1], "fcfs,1,2.33,5.33,100.00,0.3333");
    assert!(lines[2].starts_with("rr,1,"));
}

#[test]
fn test_performance_report_appends_to_existing_file() {
    common::setup_test();
    let file = write_workload("algorithm,cores,avg_waiting_time,avg_turnaround_time,cpu_utilization,throughput\n");
    let engine = common::run(PolicyKind::Sjf, default_workload());
    report::append_performance_row(file.path(), &engine.summary()).unwrap();

    let csv = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(csv.matches("algorithm,").count(), 1);
    assert_eq!(csv.lines().count(), 2);
}

#[test]
fn test_report_into_missing_directory_fails_with_context() {
    common::setup_test();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no/such/dir/performance.csv");
    let engine = common::run(PolicyKind::Fcfs, default_workload());

    let err = report::append_performance_row(&path, &engine.summary()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to open"));
}

#[test]
fn test_table_and_metrics_render() {
    common::setup_test();
    let engine = common::run(PolicyKind::Fcfs, default_workload());

    let mut out = Vec::new();
    report::write_table(&mut out, engine.processes()).unwrap();
    report::write_metrics(&mut out, &engine.summary()).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("PID"));
    assert!(text.contains("Avg WT : 2.33"));
    assert!(text.contains("Avg TAT: 5.33"));
    assert!(text.contains("CPU Utilization: 100.00%"));
    assert!(text.contains("Throughput     : 0.3333"));
}

#[test]
fn test_plain_gantt_has_no_escapes() {
    common::setup_test();
    let engine = common::run(PolicyKind::Fcfs, default_workload());

    let mut plain = Vec::new();
    report::write_gantt(&mut plain, engine.timeline(), false).unwrap();
    let plain = String::from_utf8(plain).unwrap();
    assert!(!plain.contains('\x1b'));
    assert!(plain.contains("| P1 | P1 |"));

    let mut colored = Vec::new();
    report::write_gantt(&mut colored, engine.timeline(), true).unwrap();
    assert!(String::from_utf8(colored).unwrap().contains("\x1b[0m"));
}

#[test]
fn test_json_report() {
    common::setup_test();
    let engine = common::run(PolicyKind::Rr, default_workload());

    let mut out = Vec::new();
    report::write_json(&mut out, &engine).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(value["summary"]["algorithm"], "rr");
    assert_eq!(value["summary"]["total_time"], 9);
    assert_eq!(value["config"]["quantum"], 2);
    assert_eq!(value["processes"].as_array().unwrap().len(), 3);
    assert_eq!(value["timeline"][6], "P3");
}
