//! Backward TD(0) learner.
//!
//! # Algorithm
//!
//! With records `0..N` (oldest first), tuple indices `I_k` and move rewards `r_k`:
//!
//! 1. The terminal after-state has value 0: zero `W[p][I_{N-1}[p]]` for every
//!    tuple `p`.
//! 2. For `k` from `N-2` down to `0`:
//!    - `td_error = V(I_{k+1}) - V(I_k) + r_{k+1}` using the current weights, so
//!      `V(I_{k+1})` already reflects the update made one step later
//!    - `W[p][I_k[p]] += alpha * td_error` for every tuple `p`
//!
//! Credit flows from the terminal state back to the first move of the episode.
//! The reward of move 0 is never used: no after-state precedes it.

use crate::evaluator::Evaluator;
use crate::learning::trajectory::Trajectory;
use crate::pattern::NUM_TUPLES;

/// Default step size.
pub const DEFAULT_ALPHA: f32 = 0.1 / 32.0;

/// Statistics from one backward pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TDUpdateStats {
    /// Number of records processed
    pub moves_processed: usize,
    /// Table entries written, terminal zeroing included
    pub entries_updated: u64,
    /// Mean |td_error| over the non-terminal records
    pub avg_td_error: f32,
    /// Max |td_error|
    pub max_td_error: f32,
    /// Entries reset to 0.0 because they became NaN or infinite
    pub recovered_entries: u64,
}

/// TD(0) learner with a fixed step size.
///
/// # Example
///
/// ```
/// use tdl2048::evaluator::Evaluator;
/// use tdl2048::learning::{AfterstateRecord, TDLearner, Trajectory};
///
/// let mut evaluator = Evaluator::new();
/// let mut trajectory = Trajectory::new();
/// trajectory.push(AfterstateRecord::new([1; 8], 0.0));
/// trajectory.push(AfterstateRecord::new([2; 8], 3.0));
///
/// let stats = TDLearner::default().update(&trajectory, &mut evaluator);
/// assert_eq!(stats.moves_processed, 2);
/// assert!(evaluator.evaluate_indices(&[1; 8]) > 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TDLearner {
    alpha: f32,
}

impl Default for TDLearner {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl TDLearner {
    pub fn new(alpha: f32) -> Self {
        Self { alpha }
    }

    /// Run the backward pass over a finished episode.
    ///
    /// The trajectory is left as is; the caller discards it.
    pub fn update(&self, trajectory: &Trajectory, evaluator: &mut Evaluator) -> TDUpdateStats {
        let records = trajectory.records();
        let Some(terminal) = records.last() else {
            return TDUpdateStats::default();
        };

        let mut stats = TDUpdateStats {
            moves_processed: records.len(),
            ..TDUpdateStats::default()
        };

        let weights = evaluator.weights_mut();
        for (table, &index) in terminal.indices.iter().enumerate() {
            weights.set(table, index, 0.0);
        }
        stats.entries_updated += NUM_TUPLES as u64;

        let mut total_td_error = 0.0f32;

        for pair in records.windows(2).rev() {
            let (current, next) = (&pair[0], &pair[1]);

            let td_error = evaluator.evaluate_indices(&next.indices)
                - evaluator.evaluate_indices(&current.indices)
                + next.reward;
            let delta = self.alpha * td_error;

            let weights = evaluator.weights_mut();
            for (table, &index) in current.indices.iter().enumerate() {
                weights.add(table, index, delta);
                if !weights.get(table, index).is_finite() {
                    weights.set(table, index, 0.0);
                    stats.recovered_entries += 1;
                }
            }
            stats.entries_updated += NUM_TUPLES as u64;

            total_td_error += td_error.abs();
            stats.max_td_error = stats.max_td_error.max(td_error.abs());
        }

        if records.len() > 1 {
            stats.avg_td_error = total_td_error / (records.len() - 1) as f32;
        }

        if stats.recovered_entries > 0 {
            log::warn!(
                "TD update produced {} non-finite weights; reset to 0.0",
                stats.recovered_entries
            );
        }

        stats
    }

    /// Step size.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }
}
