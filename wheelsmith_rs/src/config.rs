use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the number pool comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PoolSource {
    /// Use exactly these numbers.
    Explicit { numbers: Vec<i64> },
    /// Draw `size` distinct numbers from `min..=max`, always including the
    /// fixed numbers. Seeded by `Config::seed` when set.
    Random { min: i64, max: i64, size: usize },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Write `wheel.csv` and `wheel_manifest.json` into the output directory.
    #[default]
    Csv,
    /// Keep results in memory only.
    None,
}

impl ExportFormat {
    pub fn should_export(self) -> bool {
        !matches!(self, ExportFormat::None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub pool: PoolSource,
    /// Length of every generated combination.
    pub k: usize,
    /// Numbers forced into every combination.
    #[serde(default)]
    pub fixed: Vec<i64>,
    /// Size of the sub-combinations the reduced set must cover.
    pub guarantee: usize,
    /// Optional cap on the reduced output. Coverage may be incomplete when
    /// the cap is hit.
    #[serde(default)]
    pub max_output: Option<usize>,
    /// Seed for the single run generator used by random pool completion and
    /// capped sampling. When None, the generator is seeded from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub export: ExportFormat,
    /// Refuse to generate when the predicted combination count exceeds this
    /// value. None disables the guard.
    #[serde(default = "default_combination_limit")]
    pub combination_limit: Option<u64>,
    /// Resolve the pool and predict counts without generating.
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub quiet: bool,
}

pub const DEFAULT_COMBINATION_LIMIT: u64 = 5_000_000;

fn default_combination_limit() -> Option<u64> {
    Some(DEFAULT_COMBINATION_LIMIT)
}
