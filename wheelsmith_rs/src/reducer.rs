//! Greedy coverage reduction.
//!
//! Given the full list of combinations and a guarantee size `g`, the reducer
//! selects combinations until every `g`-sized sub-combination ("target")
//! occurring in the input is contained in at least one selected combination.
//! Each step picks the combination covering the most still-uncovered
//! targets; ties go to the lexicographically smallest combination.
//!
//! This is the classic greedy set-cover heuristic. It is not guaranteed to
//! find the smallest possible selection (minimum set cover is NP-hard); it
//! is guaranteed to reach full coverage unless a cap or cancellation stops
//! it first.
//!
//! Selection is evaluated lazily: candidates sit in a max-heap keyed by a
//! possibly stale gain. Gains can only shrink as coverage grows, so a popped
//! candidate whose recomputed gain still matches its key beats every other
//! candidate, and the heap order `(gain desc, index asc)` reproduces the
//! full-scan pick exactly.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ahash::AHashMap;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combinator::{Combination, IndexSubsets, combination_count};
use crate::error::{Result, WheelError};
use crate::progress::{CancellationToken, NoProgress, Phase, ProgressObserver, SelectionTracker};

/// Target-building progress is reported every this many combinations.
const BUILD_REPORT_INTERVAL: usize = 4_096;

/// Why the greedy loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionStatus {
    /// Every target is covered.
    Complete,
    /// The output cap was reached before full coverage.
    CapReached,
    /// No remaining combination covers anything new.
    Exhausted,
    /// The cancellation token was observed; the selection so far is returned.
    Cancelled,
}

impl ReductionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReductionStatus::Complete => "complete",
            ReductionStatus::CapReached => "cap_reached",
            ReductionStatus::Exhausted => "exhausted",
            ReductionStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_complete(self) -> bool {
        matches!(self, ReductionStatus::Complete)
    }
}

/// Result of one reduction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reduction {
    /// Selected combinations, sorted ascending.
    pub combinations: Vec<Combination>,
    pub status: ReductionStatus,
    /// Size of the target universe (distinct guarantee-sized sub-combinations).
    pub target_count: usize,
    /// Targets contained in at least one selected combination.
    pub covered_count: usize,
}

impl Reduction {
    pub fn uncovered_count(&self) -> usize {
        self.target_count - self.covered_count
    }
}

/// Configured greedy reducer. Build one per request; it holds no state
/// between calls.
#[derive(Debug, Clone)]
pub struct CoverageReducer {
    guarantee: usize,
    max_output: Option<usize>,
    cancel: CancellationToken,
}

impl CoverageReducer {
    pub fn new(guarantee: usize) -> Self {
        Self {
            guarantee,
            max_output: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_max_output(mut self, max_output: Option<usize>) -> Self {
        self.max_output = max_output;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reduce `combinations`, drawing any randomness from `rng` and
    /// reporting progress to `observer`.
    ///
    /// When the guarantee equals the combination length every combination is
    /// its own target, so nothing can be dropped without losing coverage: the
    /// input is returned whole, or, when capped, as a uniform random sample
    /// of `max_output` combinations.
    pub fn reduce<R, O>(
        &self,
        combinations: &[Combination],
        rng: &mut R,
        observer: &mut O,
    ) -> Result<Reduction>
    where
        R: Rng + ?Sized,
        O: ProgressObserver + ?Sized,
    {
        let combos = normalize(combinations)?;
        let k = combos[0].len();
        if self.guarantee == 0 || self.guarantee > k {
            return Err(WheelError::InvalidGuarantee {
                guarantee: self.guarantee,
                k,
            });
        }
        if self.max_output == Some(0) {
            return Err(WheelError::InvalidArgument(
                "maximum output must be positive".to_string(),
            ));
        }

        if self.guarantee == k {
            return Ok(self.sample_whole(combos, rng, observer));
        }

        let Some(targets) = TargetIndex::build(&combos, self.guarantee, &self.cancel, observer)
        else {
            return Ok(Reduction {
                combinations: Vec::new(),
                status: ReductionStatus::Cancelled,
                target_count: 0,
                covered_count: 0,
            });
        };
        debug!(
            combinations = combos.len(),
            targets = targets.universe,
            per_combination = targets.stride,
            "target universe built"
        );

        let (mut selected, status, covered_count) = self.select(&targets, observer);
        selected.sort_unstable();
        debug!(
            selected = selected.len(),
            covered = covered_count,
            status = status.as_str(),
            "greedy selection finished"
        );

        let mut combos = combos;
        let combinations = selected
            .into_iter()
            .map(|index| std::mem::take(&mut combos[index]))
            .collect();
        Ok(Reduction {
            combinations,
            status,
            target_count: targets.universe,
            covered_count,
        })
    }

    fn select<O>(
        &self,
        targets: &TargetIndex,
        observer: &mut O,
    ) -> (Vec<usize>, ReductionStatus, usize)
    where
        O: ProgressObserver + ?Sized,
    {
        let mut covered = vec![false; targets.universe];
        let mut covered_count = 0usize;
        let mut tracker = SelectionTracker::new(self.max_output);
        let mut selected = Vec::new();

        // Every combination starts with all of its own targets uncovered.
        let mut remaining: BinaryHeap<Candidate> = (0..targets.combination_count())
            .map(|index| Candidate {
                gain: targets.stride,
                index: Reverse(index),
            })
            .collect();

        let status = loop {
            if covered_count == targets.universe {
                break ReductionStatus::Complete;
            }
            if self.cancel.is_cancelled() {
                break ReductionStatus::Cancelled;
            }
            let Some(top) = remaining.pop() else {
                break ReductionStatus::Exhausted;
            };
            let index = top.index.0;
            let gain = targets
                .targets_of(index)
                .iter()
                .filter(|&&id| !covered[id as usize])
                .count();
            if gain == 0 {
                // Gains never grow back, so this candidate is spent.
                continue;
            }
            if gain < top.gain {
                remaining.push(Candidate {
                    gain,
                    index: Reverse(index),
                });
                continue;
            }

            for &id in targets.targets_of(index) {
                let slot = &mut covered[id as usize];
                if !*slot {
                    *slot = true;
                    covered_count += 1;
                }
            }
            selected.push(index);
            observer.on_progress(
                Phase::Selecting,
                covered_count as f64 / targets.universe as f64,
            );

            if !tracker.record_selection() && covered_count < targets.universe {
                break ReductionStatus::CapReached;
            }
        };

        (selected, status, covered_count)
    }

    fn sample_whole<R, O>(&self, combos: Vec<Combination>, rng: &mut R, observer: &mut O) -> Reduction
    where
        R: Rng + ?Sized,
        O: ProgressObserver + ?Sized,
    {
        let total = combos.len();
        observer.on_progress(Phase::BuildingTargets, 1.0);
        let (combinations, status) = match self.max_output {
            Some(cap) if cap < total => {
                let mut picked: Vec<Combination> = combos.choose_multiple(rng, cap).cloned().collect();
                picked.sort_unstable();
                (picked, ReductionStatus::CapReached)
            }
            _ => (combos, ReductionStatus::Complete),
        };
        let covered_count = combinations.len();
        observer.on_progress(Phase::Selecting, covered_count as f64 / total as f64);
        Reduction {
            combinations,
            status,
            target_count: total,
            covered_count,
        }
    }
}

/// Reduce with no progress reporting and no cancellation.
///
/// The capped `guarantee == k` case samples with the thread-local generator;
/// use [`CoverageReducer::reduce`] with a seeded generator for reproducible
/// samples.
pub fn reduce_with_guarantee(
    combinations: &[Combination],
    guarantee: usize,
    max_output: Option<usize>,
) -> Result<Reduction> {
    CoverageReducer::new(guarantee)
        .with_max_output(max_output)
        .reduce(combinations, &mut rand::rng(), &mut NoProgress)
}

/// Every distinct `g`-sized sub-combination appearing in the input, sorted.
/// Exposed for callers and tests that need to verify coverage.
pub fn target_subsets(combinations: &[Combination], guarantee: usize) -> Vec<Combination> {
    let mut out: Vec<Combination> = combinations
        .iter()
        .flat_map(|combo| sub_combinations(combo, guarantee))
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// All `g`-sized sub-combinations of one sorted combination, in
/// lexicographic order.
pub fn sub_combinations(combo: &[i64], guarantee: usize) -> Vec<Combination> {
    let mut subsets = IndexSubsets::new(combo.len(), guarantee);
    let mut out = Vec::new();
    while let Some(positions) = subsets.next_subset() {
        out.push(positions.iter().map(|&p| combo[p]).collect());
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    gain: usize,
    index: Reverse<usize>,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gain
            .cmp(&other.gain)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dense target ids for every combination, `stride` ids per combination.
struct TargetIndex {
    ids: Vec<u32>,
    stride: usize,
    universe: usize,
}

impl TargetIndex {
    /// Returns `None` when cancelled mid-build.
    fn build<O>(
        combos: &[Combination],
        guarantee: usize,
        cancel: &CancellationToken,
        observer: &mut O,
    ) -> Option<Self>
    where
        O: ProgressObserver + ?Sized,
    {
        let mut values: Vec<i64> = combos.iter().flatten().copied().collect();
        values.sort_unstable();
        values.dedup();

        let k = combos[0].len();
        let positions = IndexSubsets::new(k, guarantee).collect_all();
        let stride = positions.len();
        debug_assert_eq!(stride as u128, combination_count(k, guarantee));

        // Targets are keyed by their value indices; the key is only
        // allocated the first time a target is seen.
        let mut interned: AHashMap<Box<[u32]>, u32> = AHashMap::new();
        let mut ids = Vec::with_capacity(combos.len() * stride);
        let mut value_index = vec![0u32; k];
        let mut scratch = vec![0u32; guarantee];
        let total = combos.len();

        for (processed, combo) in combos.iter().enumerate() {
            if processed % BUILD_REPORT_INTERVAL == 0 {
                if cancel.is_cancelled() {
                    return None;
                }
                observer.on_progress(Phase::BuildingTargets, processed as f64 / total as f64);
            }
            for (slot, value) in value_index.iter_mut().zip(combo) {
                // Every value came from `values`, so the search always hits.
                *slot = values.binary_search(value).unwrap_or_default() as u32;
            }
            for subset in &positions {
                for (dst, &p) in scratch.iter_mut().zip(subset) {
                    *dst = value_index[p];
                }
                let id = match interned.get(scratch.as_slice()) {
                    Some(&id) => id,
                    None => {
                        let id = interned.len() as u32;
                        interned.insert(scratch.clone().into_boxed_slice(), id);
                        id
                    }
                };
                ids.push(id);
            }
        }
        observer.on_progress(Phase::BuildingTargets, 1.0);

        Some(Self {
            ids,
            stride,
            universe: interned.len(),
        })
    }

    fn combination_count(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.ids.len() / self.stride
        }
    }

    fn targets_of(&self, index: usize) -> &[u32] {
        &self.ids[index * self.stride..(index + 1) * self.stride]
    }
}

/// Validate equal lengths and distinct members, sort each tuple and the
/// list, and drop duplicate tuples.
fn normalize(combinations: &[Combination]) -> Result<Vec<Combination>> {
    let Some(first) = combinations.first() else {
        return Err(WheelError::EmptyInput);
    };
    let k = first.len();
    if k == 0 {
        return Err(WheelError::InvalidArgument(
            "combinations must not be empty tuples".to_string(),
        ));
    }
    let mut combos = Vec::with_capacity(combinations.len());
    for combo in combinations {
        if combo.len() != k {
            return Err(WheelError::InvalidArgument(format!(
                "combination {combo:?} has length {} but expected {k}",
                combo.len()
            )));
        }
        let mut sorted = combo.clone();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(WheelError::DuplicateNumber(pair[0]));
        }
        combos.push(sorted);
    }
    combos.sort_unstable();
    combos.dedup();
    Ok(combos)
}
