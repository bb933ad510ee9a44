use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Stage of a reduction, as reported to a [`ProgressObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Enumerating the guarantee-sized sub-combinations of every input.
    BuildingTargets,
    /// Greedy selection; the fraction is covered targets over all targets.
    Selecting,
}

/// Receives progress at iteration boundaries. Fractions are in `0.0..=1.0`.
pub trait ProgressObserver {
    fn on_progress(&mut self, phase: Phase, fraction: f64);
}

impl<F> ProgressObserver for F
where
    F: FnMut(Phase, f64),
{
    fn on_progress(&mut self, phase: Phase, fraction: f64) {
        self(phase, fraction)
    }
}

/// Observer that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _phase: Phase, _fraction: f64) {}
}

/// Observer that logs each phase at `info` level whenever progress crosses
/// another `step` (for example every 10%).
#[derive(Debug, Clone)]
pub struct LogProgress {
    step: f64,
    last: Option<(Phase, f64)>,
}

impl LogProgress {
    pub fn new(step: f64) -> Self {
        Self {
            step: step.clamp(0.01, 1.0),
            last: None,
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl LogProgress {
    /// Whether an update is worth a log line: the first update of a phase,
    /// the first to reach 100%, or one at least `step` past the last logged.
    /// Records the update as logged when it is.
    fn take_due(&mut self, phase: Phase, fraction: f64) -> bool {
        let due = match self.last {
            Some((last_phase, last_fraction)) if last_phase == phase => {
                (fraction >= 1.0 && last_fraction < 1.0) || fraction - last_fraction >= self.step
            }
            _ => true,
        };
        if due {
            self.last = Some((phase, fraction));
        }
        due
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, phase: Phase, fraction: f64) {
        if self.take_due(phase, fraction) {
            tracing::info!(phase = ?phase, percent = %format!("{:.1}", fraction * 100.0), "reduction progress");
        }
    }
}

/// Cooperative cancellation flag shared between a caller and a running
/// reduction. Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Counts greedy picks against an optional output cap.
#[derive(Debug)]
pub struct SelectionTracker {
    selected: usize,
    limit: Option<usize>,
}

impl SelectionTracker {
    pub fn new(limit: Option<usize>) -> Self {
        Self { selected: 0, limit }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Record one pick; returns whether another pick is still allowed.
    pub fn record_selection(&mut self) -> bool {
        self.selected += 1;
        self.limit.is_none_or(|limit| self.selected < limit)
    }
}
