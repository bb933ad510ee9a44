pub mod combinator;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod pool;
pub mod progress;
pub mod reducer;

pub use combinator::{Combination, generate_combinations, predicted_count};
pub use config::{Config, ExportFormat, PoolSource};
pub use error::WheelError;
pub use pipeline::{WheelPipeline, WheelReport, WheelRun};
pub use pool::NumberPool;
pub use progress::{CancellationToken, Phase, ProgressObserver};
pub use reducer::{CoverageReducer, Reduction, ReductionStatus, reduce_with_guarantee};
