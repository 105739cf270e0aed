//! Action vocabulary shared by the player and the environment.

use std::fmt;

use crate::board::{Board, Direction, Reward};

/// An action produced by an agent.
///
/// `None` means both "pass" and "episode over"; callers tell them apart from the
/// game state, not from the action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Action {
    /// Slide every line in a direction.
    Slide(Direction),
    /// Put a tile of rank `tile` on the empty cell `pos`.
    Place { pos: usize, tile: u8 },
    /// No-op.
    #[default]
    None,
}

impl Action {
    /// Apply the action to a board.
    ///
    /// Returns the reward, or `None` when the action is illegal on this board or
    /// is the no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use tdl2048::action::Action;
    /// use tdl2048::board::{Board, Direction};
    ///
    /// let mut board = Board::new();
    /// assert_eq!(Action::Place { pos: 5, tile: 2 }.apply(&mut board), Some(0));
    /// assert_eq!(Action::Place { pos: 5, tile: 1 }.apply(&mut board), None);
    /// assert_eq!(Action::Slide(Direction::Left).apply(&mut board), Some(0));
    /// assert_eq!(board.get(4), 2);
    /// ```
    pub fn apply(&self, board: &mut Board) -> Option<Reward> {
        match *self {
            Action::Slide(dir) => board.slide(dir),
            Action::Place { pos, tile } => {
                if pos >= board.cells().len() || board.get(pos) != 0 {
                    return None;
                }
                board.set(pos, tile);
                Some(0)
            }
            Action::None => None,
        }
    }

    /// Direction of a slide action.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        match *self {
            Action::Slide(dir) => Some(dir),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Slide(dir) => write!(f, "#{}", dir),
            Action::Place { pos, tile } => write!(f, "{}@{}", tile, pos),
            Action::None => f.write_str("??"),
        }
    }
}
