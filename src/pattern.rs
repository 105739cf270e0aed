//! Tuple features and the radix-15 index hash.
//!
//! A tuple feature samples four board cells in a fixed order. The four ranks are
//! read as big-endian base-15 digits, giving an index into that tuple's weight
//! table:
//!
//! ```text
//! index = 3375 * r0 + 225 * r1 + 15 * r2 + r3      (r0..r3 in 0..=14)
//! ```
//!
//! The default network uses the four rows followed by the four columns.

use thiserror::Error;

use crate::board::{Board, NUM_CELLS};

/// Cells per tuple.
pub const TUPLE_LEN: usize = 4;

/// Number of tuples in the default network.
pub const NUM_TUPLES: usize = 8;

/// Size of the feature alphabet (ranks 0-14).
pub const RANK_RADIX: usize = 15;

/// Entries per weight table: 15^4.
pub const TUPLE_TABLE_SIZE: usize = RANK_RADIX * RANK_RADIX * RANK_RADIX * RANK_RADIX;

/// Tuple definition errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PatternError {
    /// Cell position outside 0..16
    #[error("Invalid tuple position: {0}")]
    InvalidPosition(usize),

    /// The same cell appears twice in one tuple
    #[error("Duplicate tuple position: {0}")]
    DuplicatePosition(usize),
}

/// An ordered 4-tuple of board cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TupleFeature {
    /// Tuple id, equal to the index of its weight table
    pub id: u8,
    /// Sampled cells, most significant digit first
    pub positions: [usize; TUPLE_LEN],
}

/// Rows 0-3 then columns 0-3.
pub const DEFAULT_TUPLES: [TupleFeature; NUM_TUPLES] = [
    TupleFeature { id: 0, positions: [0, 1, 2, 3] },
    TupleFeature { id: 1, positions: [4, 5, 6, 7] },
    TupleFeature { id: 2, positions: [8, 9, 10, 11] },
    TupleFeature { id: 3, positions: [12, 13, 14, 15] },
    TupleFeature { id: 4, positions: [0, 4, 8, 12] },
    TupleFeature { id: 5, positions: [1, 5, 9, 13] },
    TupleFeature { id: 6, positions: [2, 6, 10, 14] },
    TupleFeature { id: 7, positions: [3, 7, 11, 15] },
];

impl TupleFeature {
    /// Create a tuple feature.
    ///
    /// # Errors
    ///
    /// - `PatternError::InvalidPosition` when a cell is outside 0..16
    /// - `PatternError::DuplicatePosition` when a cell is repeated
    pub fn new(id: u8, positions: [usize; TUPLE_LEN]) -> Result<Self, PatternError> {
        for (i, &pos) in positions.iter().enumerate() {
            if pos >= NUM_CELLS {
                return Err(PatternError::InvalidPosition(pos));
            }
            if positions[..i].contains(&pos) {
                return Err(PatternError::DuplicatePosition(pos));
            }
        }
        Ok(Self { id, positions })
    }
}

/// Table index of one tuple on a board.
///
/// # Panics
///
/// When a sampled rank is 15 or more. Such a rank comes from a broken board
/// encoding and would otherwise alias an unrelated table slot.
///
/// # Examples
///
/// ```
/// use tdl2048::board::Board;
/// use tdl2048::pattern::{DEFAULT_TUPLES, extract_index};
///
/// let board = Board::from_cells([1, 2, 3, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
/// assert_eq!(extract_index(&board, &DEFAULT_TUPLES[0]), 3375 + 2 * 225 + 3 * 15 + 4);
/// ```
#[inline]
pub fn extract_index(board: &Board, tuple: &TupleFeature) -> usize {
    tuple.positions.iter().fold(0, |index, &pos| {
        let rank = board.get(pos) as usize;
        assert!(
            rank < RANK_RADIX,
            "rank {} at cell {} exceeds the feature alphabet (0-{})",
            rank,
            pos,
            RANK_RADIX - 1
        );
        index * RANK_RADIX + rank
    })
}

/// Indices of every tuple, written into `out`.
#[inline]
pub fn extract_all_into(
    board: &Board,
    tuples: &[TupleFeature; NUM_TUPLES],
    out: &mut [usize; NUM_TUPLES],
) {
    for (slot, tuple) in out.iter_mut().zip(tuples.iter()) {
        *slot = extract_index(board, tuple);
    }
}

/// Indices of every tuple.
pub fn extract_all(board: &Board, tuples: &[TupleFeature; NUM_TUPLES]) -> [usize; NUM_TUPLES] {
    let mut out = [0usize; NUM_TUPLES];
    extract_all_into(board, tuples, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_size() {
        assert_eq!(TUPLE_TABLE_SIZE, 50625);
    }

    #[test]
    fn test_default_tuple_ids_match_slots() {
        for (i, tuple) in DEFAULT_TUPLES.iter().enumerate() {
            assert_eq!(tuple.id as usize, i);
            assert!(TupleFeature::new(tuple.id, tuple.positions).is_ok());
        }
    }

    #[test]
    fn test_new_rejects_bad_positions() {
        assert_eq!(
            TupleFeature::new(0, [0, 1, 2, 16]),
            Err(PatternError::InvalidPosition(16))
        );
        assert_eq!(
            TupleFeature::new(0, [0, 1, 1, 3]),
            Err(PatternError::DuplicatePosition(1))
        );
    }

    #[test]
    fn test_empty_board_maps_to_zero() {
        let board = Board::new();
        assert_eq!(extract_all(&board, &DEFAULT_TUPLES), [0; NUM_TUPLES]);
    }

    #[test]
    fn test_index_uses_tuple_order() {
        let mut board = Board::new();
        board.set(0, 1);
        board.set(4, 2);
        // row 0 sees rank 1 as its most significant digit
        assert_eq!(extract_index(&board, &DEFAULT_TUPLES[0]), 3375);
        // column 0 sees ranks 1, 2 as its first two digits
        assert_eq!(extract_index(&board, &DEFAULT_TUPLES[4]), 3375 + 2 * 225);
        // row 1 sees rank 2 first
        assert_eq!(extract_index(&board, &DEFAULT_TUPLES[1]), 2 * 3375);
    }

    #[test]
    fn test_max_index_in_range() {
        let board = Board::from_cells([14; 16]).unwrap();
        for tuple in &DEFAULT_TUPLES {
            assert_eq!(extract_index(&board, tuple), TUPLE_TABLE_SIZE - 1);
        }
    }

    #[test]
    fn test_indices_always_in_range() {
        let mut board = Board::new();
        for pos in 0..16 {
            board.set(pos, ((pos * 7) % 15) as u8);
        }
        for index in extract_all(&board, &DEFAULT_TUPLES) {
            assert!(index < TUPLE_TABLE_SIZE);
        }
    }

    #[test]
    #[should_panic(expected = "exceeds the feature alphabet")]
    fn test_out_of_range_rank_panics() {
        let mut board = Board::new();
        board.set(2, 15);
        extract_index(&board, &DEFAULT_TUPLES[0]);
    }

    #[test]
    fn test_extract_is_pure() {
        let board = Board::from_cells([3, 1, 0, 2, 5, 0, 0, 1, 0, 0, 4, 0, 2, 0, 0, 6]).unwrap();
        let first = extract_all(&board, &DEFAULT_TUPLES);
        let second = extract_all(&board, &DEFAULT_TUPLES);
        assert_eq!(first, second);
    }
}
