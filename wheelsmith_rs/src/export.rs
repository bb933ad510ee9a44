use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::combinator::Combination;
use crate::error::WheelError;
use crate::pipeline::WheelReport;

pub const CSV_FILE_NAME: &str = "wheel.csv";
pub const MANIFEST_FILE_NAME: &str = "wheel_manifest.json";

/// Files written by [`export_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub manifest: PathBuf,
}

/// Write the CSV table and the JSON manifest for `report` into `output_dir`.
pub fn export_report(output_dir: &Path, report: &WheelReport) -> Result<ExportPaths> {
    if report.is_dry_run() {
        return Err(WheelError::Export("dry-run reports hold no combinations".to_string()).into());
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
    let paths = ExportPaths {
        csv: output_dir.join(CSV_FILE_NAME),
        manifest: output_dir.join(MANIFEST_FILE_NAME),
    };
    write_csv(&paths.csv, report)?;
    write_manifest(&paths.manifest, report)?;
    Ok(paths)
}

/// `# key: value` lines describing the run, prefixed to the CSV data.
pub fn header_block(report: &WheelReport) -> Vec<String> {
    let status = report.status.map(|status| status.as_str()).unwrap_or("dry_run");
    vec![
        format!("# generated_at: {}", report.generated_at.to_rfc3339()),
        format!("# pool: {}", join_numbers(&report.pool)),
        format!("# combination_length: {}", report.k),
        format!("# fixed: {}", join_numbers(&report.fixed)),
        format!("# guarantee: {}", report.guarantee),
        format!(
            "# max_output: {}",
            report
                .max_output
                .map(|cap| cap.to_string())
                .unwrap_or_else(|| "none".to_string())
        ),
        format!(
            "# seed: {}",
            report
                .seed
                .map(|seed| seed.to_string())
                .unwrap_or_else(|| "none".to_string())
        ),
        format!("# full_combinations: {}", report.full_count),
        format!("# selected_combinations: {}", report.selected_count()),
        format!("# target_subsets: {}", report.target_count),
        format!("# covered_subsets: {}", report.covered_count),
        format!("# status: {status}"),
        format!("# reduction_pct: {:.2}", report.reduction_pct()),
    ]
}

/// One `N1..Nk` column per position, one row per combination.
pub fn combinations_frame(combinations: &[Combination], k: usize) -> Result<DataFrame> {
    let columns: Vec<Series> = (0..k)
        .map(|position| {
            let values: Vec<i64> = combinations.iter().map(|combo| combo[position]).collect();
            Series::new(&column_name(position), values)
        })
        .collect();
    DataFrame::new(columns).context("Failed to build combinations DataFrame")
}

pub fn write_csv(path: &Path, report: &WheelReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for line in header_block(report) {
        writeln!(writer, "{line}")?;
    }
    let mut frame = combinations_frame(&report.combinations, report.k)?;
    CsvWriter::new(&mut writer)
        .include_header(true)
        .finish(&mut frame)
        .with_context(|| format!("Failed to write combinations to {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

pub fn write_manifest(path: &Path, report: &WheelReport) -> Result<()> {
    let serialized = serde_json::to_vec_pretty(report)?;
    fs::write(path, serialized).with_context(|| format!("Failed to write {}", path.display()))
}

/// Fixed-width text table for terminal display.
pub fn render_table(combinations: &[Combination]) -> String {
    let Some(k) = combinations.first().map(Vec::len) else {
        return String::new();
    };
    let width = combinations
        .iter()
        .flatten()
        .map(|value| value.to_string().len())
        .chain((0..k).map(|position| column_name(position).len()))
        .max()
        .unwrap_or(1);

    let mut out = String::new();
    let header: Vec<String> = (0..k)
        .map(|position| format!("{:>width$}", column_name(position)))
        .collect();
    out.push_str(&header.join(" "));
    out.push('\n');
    for combo in combinations {
        let row: Vec<String> = combo.iter().map(|value| format!("{value:>width$}")).collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

fn column_name(position: usize) -> String {
    format!("N{}", position + 1)
}

fn join_numbers(numbers: &[i64]) -> String {
    numbers
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
