use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use crate::export_format::ExportFormatValue;
use wheelsmith_rs::config::{Config, DEFAULT_COMBINATION_LIMIT, PoolSource};

#[derive(Parser, Debug)]
#[command(
    name = "wheelsmith",
    about = "Number wheeling with guaranteed sub-combination coverage"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate every combination from a number pool and reduce it to a
    /// covering wheel
    #[command(name = "wheel")]
    Wheel(WheelArgs),
}

#[derive(Parser, Debug)]
pub struct WheelArgs {
    /// Explicit number pool (comma-delimited). Mutually exclusive with
    /// --pool-size.
    #[arg(long = "numbers", value_delimiter = ',', num_args = 1..)]
    pub numbers: Vec<i64>,

    /// Draw this many distinct numbers from --range-min..=--range-max
    /// instead of passing --numbers. Fixed numbers are always included.
    #[arg(long = "pool-size")]
    pub pool_size: Option<usize>,

    /// Smallest number a random pool may contain
    #[arg(long = "range-min", default_value_t = 1)]
    pub range_min: i64,

    /// Largest number a random pool may contain
    #[arg(long = "range-max", default_value_t = 90)]
    pub range_max: i64,

    /// Length of every combination
    #[arg(long = "k", alias = "length", default_value_t = 5)]
    pub k: usize,

    /// Numbers forced into every combination (comma-delimited)
    #[arg(long = "fixed", value_delimiter = ',', num_args = 0..)]
    pub fixed: Vec<i64>,

    /// Sub-combination size the reduced wheel must cover. Defaults to the
    /// combination length (no reduction).
    #[arg(long = "guarantee")]
    pub guarantee: Option<usize>,

    /// Optional cap on the number of combinations in the reduced wheel.
    /// Coverage may be incomplete when the cap is reached.
    #[arg(long = "max-output")]
    pub max_output: Option<usize>,

    /// Seed for the run's random generator (pool drawing and capped sampling)
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Output directory for the CSV, manifest and log file
    #[arg(long = "output-dir", value_hint = clap::ValueHint::DirPath, default_value = "wheelsmith_output")]
    pub output_dir: PathBuf,

    /// Export format for the reduced wheel
    #[arg(long = "export", value_enum, default_value = "csv")]
    pub export: ExportFormatValue,

    /// Refuse to run when more combinations than this would be generated
    #[arg(long = "combination-limit", default_value_t = DEFAULT_COMBINATION_LIMIT)]
    pub combination_limit: u64,

    /// Disable the combination limit entirely
    #[arg(long = "no-combination-limit", default_value_t = false)]
    pub no_combination_limit: bool,

    /// Resolve the pool and predict counts without generating
    #[arg(long = "dry-run", default_value_t = false)]
    pub dry_run: bool,

    /// Reduce log noise (suppresses pool listing and progress lines)
    #[arg(long = "quiet", default_value_t = false)]
    pub quiet: bool,

    /// Print the reduced wheel as a table on stdout
    #[arg(long = "print", default_value_t = false)]
    pub print: bool,

    /// Disable writing wheelsmith.log into the output directory. When set,
    /// logs are only emitted to stdout.
    #[arg(long = "no-file-log", default_value_t = false)]
    pub no_file_log: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Cli as Parser>::parse()
    }
}

impl WheelArgs {
    pub fn into_config(self) -> Result<Config> {
        let pool = match (self.numbers.is_empty(), self.pool_size) {
            (false, Some(_)) => {
                return Err(anyhow!("--numbers and --pool-size cannot be combined"));
            }
            (false, None) => PoolSource::Explicit {
                numbers: self.numbers,
            },
            (true, Some(size)) => PoolSource::Random {
                min: self.range_min,
                max: self.range_max,
                size,
            },
            (true, None) => {
                return Err(anyhow!("provide either --numbers or --pool-size"));
            }
        };

        if self.k == 0 {
            return Err(anyhow!("--k must be >= 1"));
        }
        let guarantee = self.guarantee.unwrap_or(self.k);
        if guarantee == 0 || guarantee > self.k {
            return Err(anyhow!(
                "--guarantee must be between 1 and --k ({}), got {guarantee}",
                self.k
            ));
        }
        if self.max_output == Some(0) {
            return Err(anyhow!("--max-output must be >= 1"));
        }

        let mut fixed = self.fixed;
        fixed.sort_unstable();
        fixed.dedup();

        Ok(Config {
            pool,
            k: self.k,
            fixed,
            guarantee,
            max_output: self.max_output,
            seed: self.seed,
            output_dir: self.output_dir,
            export: self.export.to_format(),
            combination_limit: if self.no_combination_limit {
                None
            } else {
                Some(self.combination_limit)
            },
            dry_run: self.dry_run,
            quiet: self.quiet,
        })
    }
}
