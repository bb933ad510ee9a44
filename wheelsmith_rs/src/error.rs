use thiserror::Error;

/// Error type for combination generation, coverage reduction and export.
///
/// Early termination of the greedy reducer is not represented here; it is a
/// regular outcome reported through [`crate::reducer::ReductionStatus`].
#[derive(Debug, Error)]
pub enum WheelError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("pool holds {pool} numbers but combinations need {k}")]
    InsufficientPool { pool: usize, k: usize },
    #[error("{fixed} fixed numbers do not fit in combinations of length {k}")]
    FixedExceedsLength { fixed: usize, k: usize },
    #[error("fixed number {0} is not part of the pool")]
    FixedNotInPool(i64),
    #[error("need {needed} non-fixed numbers to complete each combination but only {available} remain")]
    InsufficientRemainder { needed: usize, available: usize },
    #[error("number {0} appears more than once")]
    DuplicateNumber(i64),
    #[error("no combinations to reduce")]
    EmptyInput,
    #[error("guarantee {guarantee} must be between 1 and the combination length {k}")]
    InvalidGuarantee { guarantee: usize, k: usize },
    #[error("{predicted} combinations exceed the configured limit of {limit}")]
    CombinationLimit { predicted: u128, limit: u64 },
    #[error("export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, WheelError>;
