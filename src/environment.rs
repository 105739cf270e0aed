//! Random environment: places a new tile after every player move.
//!
//! New tiles only appear on the edge the last slide moved away from; at the
//! start of an episode every cell is a candidate. Tile ranks come from a bag of
//! `{1, 2, 3}` that is shuffled and refilled whenever it runs out, so every three
//! consecutive spawns from a fresh bag contain each rank exactly once. The bag
//! lives as long as the environment and carries over episode boundaries.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::action::Action;
use crate::board::{Board, Direction, NUM_CELLS};
use crate::config::AgentConfig;

/// Ranks in one full bag.
pub const BAG_TILES: [u8; 3] = [1, 2, 3];

/// Shuffled bag of spawn ranks.
#[derive(Clone, Debug, Default)]
pub struct TileBag {
    tiles: Vec<u8>,
}

impl TileBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next rank, refilling and shuffling the bag when it is empty.
    pub fn draw<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) -> u8 {
        if self.tiles.is_empty() {
            self.tiles.extend_from_slice(&BAG_TILES);
            self.tiles.shuffle(rng);
        }
        // refilled above
        self.tiles.pop().unwrap_or(BAG_TILES[0])
    }

    /// Ranks left before the next refill.
    pub fn remaining(&self) -> usize {
        self.tiles.len()
    }
}

/// Tile-placing environment agent.
#[derive(Clone, Debug)]
pub struct RandomEnvironment {
    name: String,
    rng: StdRng,
    bag: TileBag,
}

impl RandomEnvironment {
    /// Environment seeded with `seed`, or from the OS when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            name: "random".to_string(),
            rng,
            bag: TileBag::new(),
        }
    }

    /// Environment from `name=` and `seed=` options.
    pub fn from_config(config: &AgentConfig) -> Self {
        let mut env = Self::new(config.seed);
        if config.name != AgentConfig::default().name {
            env.name = config.name.clone();
        }
        env
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tile bag, shared by all episodes.
    pub fn bag(&self) -> &TileBag {
        &self.bag
    }

    /// Choose where to put the next tile.
    ///
    /// `last_move` is the slide the player just made, `None` before the first
    /// move of an episode. Returns `Action::None` when no candidate cell is empty.
    pub fn take_action(&mut self, after: &Board, last_move: Option<Direction>) -> Action {
        let mut space: Vec<usize> = match last_move {
            Some(dir) => dir.trailing_edge().to_vec(),
            None => (0..NUM_CELLS).collect(),
        };
        space.shuffle(&mut self.rng);

        match space.into_iter().find(|&pos| after.get(pos) == 0) {
            Some(pos) => Action::Place {
                pos,
                tile: self.bag.draw(&mut self.rng),
            },
            None => Action::None,
        }
    }
}
