//! Value function of the n-tuple network.
//!
//! The value of a board is the sum, over the eight tuples, of the weight that each
//! tuple's table stores at the board's tuple index.

use crate::board::Board;
use crate::learning::LearningError;
use crate::pattern::{DEFAULT_TUPLES, NUM_TUPLES, TUPLE_TABLE_SIZE, TupleFeature, extract_all_into};
use crate::weight::WeightStore;

/// Tuple definitions plus their weight tables.
///
/// # Examples
///
/// ```
/// use tdl2048::board::Board;
/// use tdl2048::evaluator::Evaluator;
///
/// let evaluator = Evaluator::new();
/// assert_eq!(evaluator.evaluate(&Board::new()), 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct Evaluator {
    tuples: [TupleFeature; NUM_TUPLES],
    weights: WeightStore,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Default tuples with zeroed tables.
    pub fn new() -> Self {
        Self {
            tuples: DEFAULT_TUPLES,
            weights: WeightStore::with_default_tables(),
        }
    }

    /// Default tuples over existing weights, e.g. loaded from disk.
    ///
    /// # Errors
    ///
    /// `LearningError::InvalidWeights` when the store does not have one table per
    /// tuple or a table is too small for the radix-15 index range.
    pub fn with_weights(weights: WeightStore) -> Result<Self, LearningError> {
        if weights.len() != NUM_TUPLES {
            return Err(LearningError::InvalidWeights(format!(
                "expected {} tables, found {}",
                NUM_TUPLES,
                weights.len()
            )));
        }
        if let Some((id, table)) = weights
            .tables()
            .iter()
            .enumerate()
            .find(|(_, t)| t.len() < TUPLE_TABLE_SIZE)
        {
            return Err(LearningError::InvalidWeights(format!(
                "table {} has {} entries, need at least {}",
                id,
                table.len(),
                TUPLE_TABLE_SIZE
            )));
        }

        Ok(Self {
            tuples: DEFAULT_TUPLES,
            weights,
        })
    }

    /// Tuple indices of a board, one per table.
    #[inline]
    pub fn indices(&self, board: &Board) -> [usize; NUM_TUPLES] {
        let mut indices = [0usize; NUM_TUPLES];
        extract_all_into(board, &self.tuples, &mut indices);
        indices
    }

    /// Value of a board.
    #[inline]
    pub fn evaluate(&self, board: &Board) -> f32 {
        self.evaluate_indices(&self.indices(board))
    }

    /// Value for precomputed tuple indices.
    #[inline]
    pub fn evaluate_indices(&self, indices: &[usize; NUM_TUPLES]) -> f32 {
        indices
            .iter()
            .enumerate()
            .map(|(table, &index)| self.weights.get(table, index))
            .sum()
    }

    #[inline]
    pub fn tuples(&self) -> &[TupleFeature; NUM_TUPLES] {
        &self.tuples
    }

    #[inline]
    pub fn weights(&self) -> &WeightStore {
        &self.weights
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut WeightStore {
        &mut self.weights
    }

    pub fn into_weights(self) -> WeightStore {
        self.weights
    }
}
