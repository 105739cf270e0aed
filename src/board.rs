//! 4x4 tile board and the single-step slide/merge rule.
//!
//! Cells hold tile *ranks*, not face values:
//!
//! | Rank | Face value |
//! |------|------------|
//! | 0 | empty |
//! | 1 | 1 |
//! | 2 | 2 |
//! | r >= 3 | 3 * 2^(r-3) |
//!
//! Positions are linear and row-major: position `p` is row `p / 4`, column `p % 4`.
//!
//! # Slide rule
//!
//! Every line moves toward the wall by at most one cell. Scanning from the wall,
//! the first tile that sits next to an empty cell or a mergeable neighbour moves
//! one step, and everything behind it follows. `1 + 2` merges into a 3; two equal
//! tiles of rank 3 or higher merge into the next rank. The move reward is the face
//! value of every tile created by a merge.

use std::fmt;

use thiserror::Error;

/// Immediate reward of one slide.
pub type Reward = u32;

/// Number of cells on the board.
pub const NUM_CELLS: usize = 16;

/// Highest rank a cell may hold. Tiles of this rank no longer merge.
pub const MAX_RANK: u8 = 14;

/// Board construction errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BoardError {
    /// Rank above MAX_RANK
    #[error("Invalid tile rank: {0}")]
    InvalidRank(u8),
}

/// Slide direction.
///
/// The discriminants are the opcodes used in the action vocabulary and define the
/// order in which the player evaluates candidate moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    /// All directions in evaluation order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Opcode of this direction (0-3).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction for an opcode, `None` when out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use tdl2048::board::Direction;
    ///
    /// assert_eq!(Direction::from_index(2), Some(Direction::Down));
    /// assert_eq!(Direction::from_index(4), None);
    /// ```
    pub fn from_index(index: usize) -> Option<Direction> {
        Self::ALL.get(index).copied()
    }

    /// Cells on the edge opposite to this direction.
    ///
    /// After a slide the freed cells are on this edge.
    pub fn trailing_edge(self) -> [usize; 4] {
        match self {
            Direction::Up => [12, 13, 14, 15],
            Direction::Right => [0, 4, 8, 12],
            Direction::Down => [0, 1, 2, 3],
            Direction::Left => [3, 7, 11, 15],
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        f.write_str(name)
    }
}

/// Lines of the board per direction, each listed from the wall outward.
const LINES: [[[usize; 4]; 4]; 4] = [
    // Up
    [[0, 4, 8, 12], [1, 5, 9, 13], [2, 6, 10, 14], [3, 7, 11, 15]],
    // Right
    [[3, 2, 1, 0], [7, 6, 5, 4], [11, 10, 9, 8], [15, 14, 13, 12]],
    // Down
    [[12, 8, 4, 0], [13, 9, 5, 1], [14, 10, 6, 2], [15, 11, 7, 3]],
    // Left
    [[0, 1, 2, 3], [4, 5, 6, 7], [8, 9, 10, 11], [12, 13, 14, 15]],
];

/// Face value of a rank.
///
/// # Examples
///
/// ```
/// use tdl2048::board::face_value;
///
/// assert_eq!(face_value(0), 0);
/// assert_eq!(face_value(2), 2);
/// assert_eq!(face_value(3), 3);
/// assert_eq!(face_value(5), 12);
/// ```
#[inline]
pub fn face_value(rank: u8) -> u32 {
    match rank {
        0..=2 => rank as u32,
        r => 3 << (r - 3),
    }
}

/// Rank produced by merging `hold` (wall side) with `tile`, if they merge.
#[inline]
fn merge(hold: u8, tile: u8) -> Option<u8> {
    match (hold, tile) {
        (1, 2) | (2, 1) => Some(3),
        (a, b) if a == b && a >= 3 && a < MAX_RANK => Some(a + 1),
        _ => None,
    }
}

/// Slide one line (wall first) by one step.
fn slide_line(line: [u8; 4]) -> Option<([u8; 4], Reward)> {
    for j in 1..4 {
        let (hold, tile) = (line[j - 1], line[j]);
        if tile == 0 {
            continue;
        }
        let (merged, reward) = if hold == 0 {
            (tile, 0)
        } else if let Some(merged) = merge(hold, tile) {
            (merged, face_value(merged))
        } else {
            continue;
        };

        let mut out = line;
        out[j - 1] = merged;
        out.copy_within(j + 1..4, j);
        out[3] = 0;
        return Some((out, reward));
    }
    None
}

/// 4x4 board of tile ranks.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [u8; NUM_CELLS],
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board").field("cells", &self.cells).finish()
    }
}

impl Board {
    /// Empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Board from 16 ranks in row-major order.
    ///
    /// # Errors
    ///
    /// `BoardError::InvalidRank` when a rank exceeds `MAX_RANK`.
    pub fn from_cells(cells: [u8; NUM_CELLS]) -> Result<Self, BoardError> {
        if let Some(&rank) = cells.iter().find(|&&r| r > MAX_RANK) {
            return Err(BoardError::InvalidRank(rank));
        }
        Ok(Self { cells })
    }

    /// Rank at `pos`.
    ///
    /// # Panics
    ///
    /// When `pos >= 16`.
    #[inline]
    pub fn get(&self, pos: usize) -> u8 {
        self.cells[pos]
    }

    /// Overwrite the rank at `pos`. The rank is not validated.
    ///
    /// # Panics
    ///
    /// When `pos >= 16`.
    #[inline]
    pub fn set(&mut self, pos: usize, rank: u8) {
        self.cells[pos] = rank;
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[u8; NUM_CELLS] {
        &self.cells
    }

    /// Apply a slide in place.
    ///
    /// Returns the reward, or `None` when nothing moves. An illegal slide leaves
    /// the board untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use tdl2048::board::{Board, Direction};
    ///
    /// let mut board = Board::from_cells([1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
    /// assert_eq!(board.slide(Direction::Left), Some(3));
    /// assert_eq!(board.get(0), 3);
    /// assert_eq!(board.slide(Direction::Up), None);
    /// ```
    pub fn slide(&mut self, dir: Direction) -> Option<Reward> {
        let mut next = self.cells;
        let mut reward = 0;
        let mut moved = false;

        for line in &LINES[dir.index()] {
            let values = line.map(|pos| self.cells[pos]);
            if let Some((slid, line_reward)) = slide_line(values) {
                for (&pos, &rank) in line.iter().zip(slid.iter()) {
                    next[pos] = rank;
                }
                reward += line_reward;
                moved = true;
            }
        }

        if moved {
            self.cells = next;
            Some(reward)
        } else {
            None
        }
    }

    /// Whether any slide is legal.
    pub fn has_legal_move(&self) -> bool {
        Direction::ALL.iter().any(|&dir| {
            let mut scratch = *self;
            scratch.slide(dir).is_some()
        })
    }

    /// Number of empty cells.
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&r| r == 0).count()
    }

    /// Highest rank on the board.
    pub fn max_rank(&self) -> u8 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Threes score: every tile of rank r >= 3 counts 3^(r-2).
    pub fn score(&self) -> u64 {
        self.cells
            .iter()
            .filter(|&&r| r >= 3)
            .map(|&r| 3u64.pow((r - 2) as u32))
            .sum()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+------------------------+")?;
        for row in self.cells.chunks(4) {
            write!(f, "|")?;
            for &rank in row {
                write!(f, "{:>6}", face_value(rank))?;
            }
            writeln!(f, "|")?;
        }
        write!(f, "+------------------------+")
    }
}
