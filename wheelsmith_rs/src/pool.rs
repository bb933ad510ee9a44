use std::ops::RangeInclusive;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WheelError};

/// Ranges wider than this are rejected before the candidate list is built.
const MAX_RANGE_SPAN: u128 = 10_000_000;

/// The universe combinations are drawn from: distinct integers kept in
/// ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberPool {
    numbers: Vec<i64>,
}

impl NumberPool {
    /// Validate and sort an explicit list of numbers.
    pub fn new(mut numbers: Vec<i64>) -> Result<Self> {
        if numbers.is_empty() {
            return Err(WheelError::InvalidArgument(
                "number pool must not be empty".to_string(),
            ));
        }
        numbers.sort_unstable();
        if let Some(pair) = numbers.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(WheelError::DuplicateNumber(pair[0]));
        }
        Ok(Self { numbers })
    }

    /// Draw a pool of `size` distinct numbers from `range`, always keeping
    /// every number in `fixed`.
    ///
    /// The non-fixed part is a uniform sample without replacement from the
    /// rest of the range, so a seeded `rng` reproduces the same pool. A
    /// `size` smaller than `fixed` is raised to `fixed.len()`.
    pub fn complete<R: Rng + ?Sized>(
        fixed: &[i64],
        range: RangeInclusive<i64>,
        size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let (min, max) = (*range.start(), *range.end());
        if min > max {
            return Err(WheelError::InvalidArgument(format!(
                "range start {min} is greater than range end {max}"
            )));
        }
        if let Some(outside) = fixed.iter().find(|value| !range.contains(*value)) {
            return Err(WheelError::InvalidArgument(format!(
                "fixed number {outside} lies outside {min}..={max}"
            )));
        }
        let span = (max as i128 - min as i128 + 1) as u128;
        if span > MAX_RANGE_SPAN {
            return Err(WheelError::InvalidArgument(format!(
                "range {min}..={max} spans more than {MAX_RANGE_SPAN} numbers"
            )));
        }
        let size = size.max(fixed.len());
        if size == 0 {
            return Err(WheelError::InvalidArgument(
                "number pool must not be empty".to_string(),
            ));
        }
        if (size as u128) > span {
            return Err(WheelError::InvalidArgument(format!(
                "cannot draw {size} distinct numbers from {min}..={max}"
            )));
        }

        let mut numbers = fixed.to_vec();
        let candidates: Vec<i64> = range.filter(|value| !fixed.contains(value)).collect();
        numbers.extend(candidates.choose_multiple(rng, size - fixed.len()).copied());
        Self::new(numbers)
    }

    pub fn numbers(&self) -> &[i64] {
        &self.numbers
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn contains(&self, value: i64) -> bool {
        self.numbers.binary_search(&value).is_ok()
    }
}
