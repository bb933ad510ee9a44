use std::fs;

use tempfile::tempdir;
use wheelsmith_rs::config::{Config, ExportFormat, PoolSource};
use wheelsmith_rs::export::{CSV_FILE_NAME, MANIFEST_FILE_NAME};
use wheelsmith_rs::{Phase, ReductionStatus, WheelPipeline, WheelReport};

fn config_for(output_dir: std::path::PathBuf) -> Config {
    Config {
        pool: PoolSource::Explicit {
            numbers: (1..=9).collect(),
        },
        k: 4,
        fixed: vec![2],
        guarantee: 2,
        max_output: None,
        seed: Some(11),
        output_dir,
        export: ExportFormat::Csv,
        combination_limit: Some(10_000),
        dry_run: false,
        quiet: true,
    }
}

#[test]
fn pipeline_exports_csv_and_manifest() {
    let dir = tempdir().unwrap();
    let output_dir = dir.path().join("nested").join("out");
    let run = WheelPipeline::new(config_for(output_dir.clone()))
        .run()
        .unwrap();

    let paths = run.exported.expect("export paths");
    assert_eq!(paths.csv, output_dir.join(CSV_FILE_NAME));
    assert_eq!(paths.manifest, output_dir.join(MANIFEST_FILE_NAME));

    let report = &run.report;
    assert_eq!(report.full_count, 56);
    assert_eq!(report.status, Some(ReductionStatus::Complete));
    assert_eq!(report.covered_count, report.target_count);
    assert!(report.selected_count() < report.full_count);

    let text = fs::read_to_string(&paths.csv).unwrap();
    let data: Vec<&str> = text.lines().filter(|line| !line.starts_with('#')).collect();
    assert_eq!(data[0], "N1,N2,N3,N4");
    assert_eq!(data.len() - 1, report.selected_count());
    assert!(text.contains("# fixed: 2"));
    assert!(text.contains("# guarantee: 2"));

    let manifest: WheelReport = serde_json::from_slice(&fs::read(&paths.manifest).unwrap()).unwrap();
    assert_eq!(manifest.combinations, report.combinations);
    assert_eq!(manifest.pool, (1..=9).collect::<Vec<i64>>());
}

#[test]
fn observer_sees_both_phases_in_order() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path().to_path_buf());
    config.export = ExportFormat::None;

    let (sender, receiver) = std::sync::mpsc::channel();
    let run = WheelPipeline::new(config)
        .with_observer(move |phase: Phase, fraction: f64| {
            let _ = sender.send((phase, fraction));
        })
        .run()
        .unwrap();
    assert!(run.exported.is_none());
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());

    let events: Vec<(Phase, f64)> = receiver.try_iter().collect();
    let first_selecting = events
        .iter()
        .position(|(phase, _)| *phase == Phase::Selecting)
        .expect("selection progress");
    assert!(events[..first_selecting]
        .iter()
        .all(|(phase, _)| *phase == Phase::BuildingTargets));
    assert!(events[first_selecting..]
        .iter()
        .all(|(phase, _)| *phase == Phase::Selecting));
    assert!((events.last().unwrap().1 - 1.0).abs() < 1e-9);
}

#[test]
fn capped_run_reports_partial_coverage() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path().to_path_buf());
    config.max_output = Some(2);
    let run = WheelPipeline::new(config).run().unwrap();

    assert_eq!(run.report.selected_count(), 2);
    assert_eq!(run.report.status, Some(ReductionStatus::CapReached));
    assert!(run.report.covered_count < run.report.target_count);
    let text = fs::read_to_string(run.exported.unwrap().csv).unwrap();
    assert!(text.contains("# status: cap_reached"));
}

#[test]
fn cancelled_before_run_returns_cancelled_status() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path().to_path_buf());
    config.export = ExportFormat::None;
    let pipeline = WheelPipeline::new(config);
    pipeline.cancellation_token().cancel();
    let run = pipeline.run().unwrap();
    assert_eq!(run.report.status, Some(ReductionStatus::Cancelled));
}
