use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::combinator::{Combination, generate_combinations, predicted_count, validate_request};
use crate::config::{Config, PoolSource};
use crate::error::WheelError;
use crate::export::{ExportPaths, export_report};
use crate::pool::NumberPool;
use crate::progress::{CancellationToken, NoProgress, ProgressObserver};
use crate::reducer::{CoverageReducer, ReductionStatus};

/// Everything one generate+reduce cycle produced, in the shape the export
/// layer and callers consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelReport {
    pub generated_at: DateTime<Utc>,
    pub pool: Vec<i64>,
    pub k: usize,
    pub fixed: Vec<i64>,
    pub guarantee: usize,
    pub max_output: Option<usize>,
    pub seed: Option<u64>,
    pub predicted_count: u128,
    /// Size of the full combination set (0 for dry runs).
    pub full_count: usize,
    pub target_count: usize,
    pub covered_count: usize,
    /// None when the run stopped before reducing (dry run).
    pub status: Option<ReductionStatus>,
    pub combinations: Vec<Combination>,
}

impl WheelReport {
    pub fn selected_count(&self) -> usize {
        self.combinations.len()
    }

    /// Share of the full set removed by the reduction, in percent.
    pub fn reduction_pct(&self) -> f64 {
        if self.full_count == 0 {
            return 0.0;
        }
        100.0 * (1.0 - self.selected_count() as f64 / self.full_count as f64)
    }

    pub fn is_dry_run(&self) -> bool {
        self.status.is_none()
    }
}

/// Outcome of [`WheelPipeline::run`]: the report plus where it was written.
#[derive(Debug, Clone)]
pub struct WheelRun {
    pub report: WheelReport,
    pub exported: Option<ExportPaths>,
}

pub struct WheelPipeline {
    config: Config,
    cancel: CancellationToken,
    observer: Box<dyn ProgressObserver>,
}

impl WheelPipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
            observer: Box::new(NoProgress),
        }
    }

    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Handle that cancels the reduction at its next iteration boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn run(mut self) -> Result<WheelRun> {
        let config = &self.config;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let pool = resolve_pool(config, &mut rng)?;
        let fixed = validate_request(&pool, config.k, &config.fixed)
            .context("Invalid combination request")?;
        let predicted = predicted_count(pool.len(), config.k, fixed.len());
        info!(
            pool_size = pool.len(),
            k = config.k,
            fixed = fixed.len(),
            guarantee = config.guarantee,
            max_output = ?config.max_output,
            predicted = %predicted,
            "wheel parameters resolved"
        );
        if !config.quiet {
            info!(pool = ?pool.numbers(), fixed = ?fixed, "number pool");
        }

        if let Some(limit) = config.combination_limit
            && predicted > limit as u128
        {
            return Err(WheelError::CombinationLimit { predicted, limit }.into());
        }

        let mut report = WheelReport {
            generated_at: Utc::now(),
            pool: pool.numbers().to_vec(),
            k: config.k,
            fixed: fixed.clone(),
            guarantee: config.guarantee,
            max_output: config.max_output,
            seed: config.seed,
            predicted_count: predicted,
            full_count: 0,
            target_count: 0,
            covered_count: 0,
            status: None,
            combinations: Vec::new(),
        };

        if config.dry_run {
            info!(predicted = %predicted, "dry run: skipping generation and reduction");
            return Ok(WheelRun {
                report,
                exported: None,
            });
        }

        let full = generate_combinations(pool.numbers(), config.k, &fixed)
            .context("Failed to generate combinations")?;
        info!(combinations = full.len(), "full combination set generated");

        let reducer = CoverageReducer::new(config.guarantee)
            .with_max_output(config.max_output)
            .with_cancellation(self.cancel.clone());
        let reduction = reducer
            .reduce(&full, &mut rng, &mut *self.observer)
            .context("Failed to reduce combinations")?;

        report.full_count = full.len();
        report.target_count = reduction.target_count;
        report.covered_count = reduction.covered_count;
        report.status = Some(reduction.status);
        report.combinations = reduction.combinations;

        match report.status {
            Some(ReductionStatus::Complete) => info!(
                selected = report.selected_count(),
                full = report.full_count,
                targets = report.target_count,
                reduction_pct = %format!("{:.2}", report.reduction_pct()),
                "reduction complete"
            ),
            Some(status) => warn!(
                status = status.as_str(),
                selected = report.selected_count(),
                covered = report.covered_count,
                targets = report.target_count,
                "reduction stopped before full coverage"
            ),
            None => {}
        }

        let exported = if config.export.should_export() {
            let paths = export_report(&config.output_dir, &report)?;
            info!(csv = %paths.csv.display(), manifest = %paths.manifest.display(), "results exported");
            Some(paths)
        } else {
            None
        };

        Ok(WheelRun { report, exported })
    }
}

fn resolve_pool(config: &Config, rng: &mut StdRng) -> Result<NumberPool> {
    let pool = match &config.pool {
        PoolSource::Explicit { numbers } => NumberPool::new(numbers.clone())?,
        PoolSource::Random { min, max, size } => {
            if *size < config.fixed.len() {
                warn!(
                    requested = size,
                    fixed = config.fixed.len(),
                    "pool size raised to include every fixed number"
                );
            }
            NumberPool::complete(&config.fixed, *min..=*max, *size, rng)?
        }
    };
    Ok(pool)
}
