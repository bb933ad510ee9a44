use itertools::Itertools;

use crate::error::{Result, WheelError};
use crate::pool::NumberPool;

/// A sorted tuple of distinct pool numbers. Every generated combination has
/// the requested length and contains the whole fixed set.
pub type Combination = Vec<i64>;

/// Positions into a combination or into a sorted value universe.
pub type IndexCombination = Vec<usize>;

/// Compute C(n, k) - the number of k-combinations from n items.
/// Returns 0 for invalid inputs (k > n). Returns 1 for k == 0.
/// Saturates at `u128::MAX` when the count does not fit.
pub fn combination_count(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    if k == 0 {
        return 1;
    }
    // C(n, k) = C(n, n-k); interleave multiply/divide so intermediates stay exact.
    let k = k.min(n - k);
    let mut result = 1u128;
    for i in 0..k {
        let Some(product) = result.checked_mul((n - i) as u128) else {
            return u128::MAX;
        };
        result = product / (i + 1) as u128;
    }
    result
}

/// Number of combinations `generate_combinations` yields for a pool of
/// `pool_len` numbers, `fixed_len` of which are forced into every
/// combination of length `k`.
pub fn predicted_count(pool_len: usize, k: usize, fixed_len: usize) -> u128 {
    if fixed_len > k || fixed_len > pool_len {
        return 0;
    }
    combination_count(pool_len - fixed_len, k - fixed_len)
}

// =============================================================================
// Lexicographic index subsets
// =============================================================================

/// Walks every k-subset of `0..n` in lexicographic order without
/// allocating per step. The current subset is lent out by
/// [`IndexSubsets::next_subset`].
#[derive(Debug, Clone)]
pub struct IndexSubsets {
    n: usize,
    current: IndexCombination,
    started: bool,
    exhausted: bool,
}

impl IndexSubsets {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            current: (0..k).collect(),
            started: false,
            exhausted: k > n,
        }
    }

    pub fn next_subset(&mut self) -> Option<&[usize]> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(&self.current);
        }
        if self.advance() {
            Some(&self.current)
        } else {
            self.exhausted = true;
            None
        }
    }

    /// Collect every remaining subset. Convenient for small `n`, where the
    /// subsets are reused many times (for example the positions of each
    /// target inside a combination).
    pub fn collect_all(mut self) -> Vec<IndexCombination> {
        let mut out = Vec::new();
        while let Some(subset) = self.next_subset() {
            out.push(subset.to_vec());
        }
        out
    }

    fn advance(&mut self) -> bool {
        let k = self.current.len();
        // Increment the rightmost position that still has room, then reset
        // everything to its right to the smallest valid run.
        for i in (0..k).rev() {
            let max_val = self.n - (k - i);
            if self.current[i] < max_val {
                self.current[i] += 1;
                for j in (i + 1)..k {
                    self.current[j] = self.current[j - 1] + 1;
                }
                return true;
            }
        }
        false
    }
}

// =============================================================================
// Generation under fixed-number constraints
// =============================================================================

/// Build every combination of length `k` drawn from `pool` that contains all
/// of `fixed`.
///
/// The result is sorted ascending (numeric tuple order) and free of
/// duplicates. Its length is `C(|pool| - |fixed|, k - |fixed|)`, which grows
/// exponentially; callers bound pool size and `k` (use [`predicted_count`]
/// before calling when the inputs come from a user).
pub fn generate_combinations(pool: &[i64], k: usize, fixed: &[i64]) -> Result<Vec<Combination>> {
    let pool = NumberPool::new(pool.to_vec())?;
    let fixed = validate_request(&pool, k, fixed)?;

    let remaining: Vec<i64> = pool
        .numbers()
        .iter()
        .copied()
        .filter(|value| fixed.binary_search(value).is_err())
        .collect();
    let slots = k - fixed.len();
    // Always satisfied once `validate_request` passes.
    if slots > remaining.len() {
        return Err(WheelError::InsufficientRemainder {
            needed: slots,
            available: remaining.len(),
        });
    }

    if slots == 0 {
        return Ok(vec![fixed]);
    }

    let mut combos: Vec<Combination> = remaining
        .into_iter()
        .combinations(slots)
        .map(|mut chosen| {
            chosen.extend_from_slice(&fixed);
            chosen.sort_unstable();
            chosen
        })
        .collect();
    combos.sort_unstable();
    combos.dedup();
    Ok(combos)
}

/// Check `k` and `fixed` against an already validated pool and return the
/// fixed numbers sorted.
///
/// Errors come in the order the generator reports them: `InvalidArgument`
/// for `k == 0`, `InsufficientPool`, `DuplicateNumber` in `fixed`,
/// `FixedExceedsLength`, then `FixedNotInPool`.
pub fn validate_request(pool: &NumberPool, k: usize, fixed: &[i64]) -> Result<Vec<i64>> {
    if k == 0 {
        return Err(WheelError::InvalidArgument(
            "combination length must be positive".to_string(),
        ));
    }
    if pool.len() < k {
        return Err(WheelError::InsufficientPool {
            pool: pool.len(),
            k,
        });
    }
    let fixed = normalize_fixed(fixed)?;
    if fixed.len() > k {
        return Err(WheelError::FixedExceedsLength {
            fixed: fixed.len(),
            k,
        });
    }
    if let Some(&missing) = fixed.iter().find(|value| !pool.contains(**value)) {
        return Err(WheelError::FixedNotInPool(missing));
    }
    Ok(fixed)
}

fn normalize_fixed(fixed: &[i64]) -> Result<Vec<i64>> {
    let mut sorted = fixed.to_vec();
    sorted.sort_unstable();
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(WheelError::DuplicateNumber(pair[0]));
    }
    Ok(sorted)
}

// =============================================================================
// Unit Tests
// =============================================================================
