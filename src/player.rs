//! Greedy one-ply lookahead player that learns from its own episodes.
//!
//! Each decision evaluates the four slides in direction order. A slide's score is
//! its immediate reward plus the network's value of the resulting after-state; the
//! best slide is played and its after-state recorded. When no slide is legal the
//! episode is over: the recorded trajectory is learned from and discarded.

use std::path::PathBuf;

use crate::action::Action;
use crate::board::{Board, Direction, Reward};
use crate::config::AgentConfig;
use crate::evaluator::Evaluator;
use crate::learning::LearningError;
use crate::learning::checkpoint::{load_weights, save_weights};
use crate::learning::td_learner::{TDLearner, TDUpdateStats};
use crate::learning::trajectory::{AfterstateRecord, Trajectory};

/// One evaluated candidate slide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOutcome {
    pub direction: Direction,
    pub reward: Reward,
    /// Board after the slide, before any tile spawns
    pub after: Board,
    /// Network value of `after`
    pub value: f32,
}

impl MoveOutcome {
    /// Immediate reward plus after-state value.
    #[inline]
    pub fn combined(&self) -> f32 {
        self.reward as f32 + self.value
    }
}

/// Best legal slide from `before`, or `None` when no slide is legal.
///
/// Ties keep the direction evaluated first. The first legal slide is always a
/// candidate, so a move is chosen even when every combined score is negative.
pub fn lookahead(evaluator: &Evaluator, before: &Board) -> Option<MoveOutcome> {
    let mut best: Option<MoveOutcome> = None;

    for dir in Direction::ALL {
        let mut after = *before;
        let Some(reward) = after.slide(dir) else {
            continue;
        };
        let outcome = MoveOutcome {
            direction: dir,
            reward,
            after,
            value: evaluator.evaluate(&after),
        };
        if best.is_none_or(|b| outcome.combined() > b.combined()) {
            best = Some(outcome);
        }
    }

    best
}

/// TD-learning player.
#[derive(Debug)]
pub struct TdPlayer {
    name: String,
    evaluator: Evaluator,
    learner: TDLearner,
    trajectory: Trajectory,
    save_path: Option<PathBuf>,
    last_update: Option<TDUpdateStats>,
}

impl TdPlayer {
    /// Player over an existing network.
    pub fn new(evaluator: Evaluator, learner: TDLearner) -> Self {
        Self {
            name: "tdl".to_string(),
            evaluator,
            learner,
            trajectory: Trajectory::new(),
            save_path: None,
            last_update: None,
        }
    }

    /// Player from `init`, `load=`, `save=`, `alpha=` and `name=` options.
    ///
    /// `load=` takes precedence over `init`.
    ///
    /// # Errors
    ///
    /// - `LearningError::Config` when neither `init` nor `load=` is given
    /// - `LearningError::Io` when the weight file cannot be opened
    /// - `LearningError::InvalidWeights` when it does not fit the network
    pub fn from_config(config: &AgentConfig) -> Result<Self, LearningError> {
        let evaluator = match (&config.load, config.init) {
            (Some(path), _) => Evaluator::with_weights(load_weights(path)?)?,
            (None, true) => Evaluator::new(),
            (None, false) => {
                return Err(LearningError::Config(
                    "player needs `init` or `load=<path>` for its weight tables".to_string(),
                ));
            }
        };

        let mut player = Self::new(evaluator, TDLearner::new(config.alpha));
        player.name = config.name.clone();
        player.save_path = config.save.clone();
        log::debug!(
            "Player {} ready: alpha={} save={:?}",
            player.name,
            config.alpha,
            player.save_path
        );
        Ok(player)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decide the next slide, or close the episode.
    ///
    /// Returns `Action::Slide` and records its after-state when a slide is legal.
    /// Otherwise runs the TD update over the episode, clears the trajectory and
    /// returns `Action::None`.
    pub fn take_action(&mut self, before: &Board) -> Action {
        match lookahead(&self.evaluator, before) {
            Some(best) => {
                let indices = self.evaluator.indices(&best.after);
                let reward_net = best.combined() - best.value;
                self.trajectory.push(AfterstateRecord::new(indices, reward_net));
                Action::Slide(best.direction)
            }
            None => {
                self.finish_episode();
                Action::None
            }
        }
    }

    /// Learn from the recorded trajectory and reset it.
    pub fn finish_episode(&mut self) -> TDUpdateStats {
        let stats = self.learner.update(&self.trajectory, &mut self.evaluator);
        log::debug!(
            "Episode closed: {} moves, avg |td| {:.4}, max |td| {:.4}",
            stats.moves_processed,
            stats.avg_td_error,
            stats.max_td_error
        );
        self.trajectory.clear();
        self.last_update = Some(stats.clone());
        stats
    }

    /// Write the weights to the `save=` path, if one was configured.
    ///
    /// # Errors
    ///
    /// `LearningError::Io` when the file cannot be written.
    pub fn save(&self) -> Result<(), LearningError> {
        match &self.save_path {
            Some(path) => save_weights(path, self.evaluator.weights()),
            None => Ok(()),
        }
    }

    pub fn save_path(&self) -> Option<&PathBuf> {
        self.save_path.as_ref()
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    /// Trajectory of the episode in flight.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn alpha(&self) -> f32 {
        self.learner.alpha()
    }

    /// Statistics of the most recent end-of-episode update.
    pub fn last_update(&self) -> Option<&TDUpdateStats> {
        self.last_update.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{NUM_TUPLES, TUPLE_TABLE_SIZE};

    fn board(cells: [u8; 16]) -> Board {
        Board::from_cells(cells).unwrap()
    }

    /// Only Up and Down are legal, both with reward 0.
    fn up_down_board() -> Board {
        board([0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0])
    }

    #[test]
    fn test_lookahead_none_when_stuck() {
        let stuck = board([1, 3, 1, 3, 3, 1, 3, 1, 1, 3, 1, 3, 3, 1, 3, 1]);
        assert!(lookahead(&Evaluator::new(), &stuck).is_none());
    }

    #[test]
    fn test_tie_keeps_first_direction() {
        let b = up_down_board();
        let mut right = b;
        assert_eq!(right.slide(Direction::Right), None);

        let best = lookahead(&Evaluator::new(), &b).unwrap();
        assert_eq!(best.direction, Direction::Up);
        assert_eq!(best.combined(), 0.0);
    }

    #[test]
    fn test_higher_value_wins_over_order() {
        let mut evaluator = Evaluator::new();
        let b = up_down_board();
        let mut down = b;
        down.slide(Direction::Down).unwrap();
        let indices = evaluator.indices(&down);
        evaluator.weights_mut().set(0, indices[0], 0.5);

        let best = lookahead(&evaluator, &b).unwrap();
        assert_eq!(best.direction, Direction::Down);
        assert_eq!(best.value, 0.5);
    }

    #[test]
    fn test_reward_beats_zero_reward() {
        // Left merges 1+2 for reward 3, everything else scores 0
        let b = board([0, 0, 0, 0, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let best = lookahead(&Evaluator::new(), &b).unwrap();
        assert_eq!(best.direction, Direction::Left);
        assert_eq!(best.reward, 3);
    }

    #[test]
    fn test_negative_scores_still_pick_a_move() {
        let mut evaluator = Evaluator::new();
        for table in 0..NUM_TUPLES {
            for index in 0..TUPLE_TABLE_SIZE {
                evaluator.weights_mut().set(table, index, -1.0);
            }
        }
        let best = lookahead(&evaluator, &up_down_board()).unwrap();
        assert_eq!(best.direction, Direction::Up);
        assert!(best.combined() < 0.0);
    }

    #[test]
    fn test_take_action_records_afterstate() {
        let mut player = TdPlayer::new(Evaluator::new(), TDLearner::default());
        let b = board([0, 0, 0, 0, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        let action = player.take_action(&b);

        assert_eq!(action, Action::Slide(Direction::Left));
        assert_eq!(player.trajectory().len(), 1);
        let record = player.trajectory().last().unwrap();
        assert_eq!(record.reward, 3.0);
        let mut after = b;
        after.slide(Direction::Left);
        assert_eq!(record.indices, player.evaluator().indices(&after));
    }

    #[test]
    fn test_take_action_on_terminal_board_learns_and_resets() {
        let mut player = TdPlayer::new(Evaluator::new(), TDLearner::default());
        player.take_action(&up_down_board());
        player.take_action(&board([0, 0, 0, 0, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]));
        assert_eq!(player.trajectory().len(), 2);

        let stuck = board([1, 3, 1, 3, 3, 1, 3, 1, 1, 3, 1, 3, 3, 1, 3, 1]);
        assert_eq!(player.take_action(&stuck), Action::None);

        assert!(player.trajectory().is_empty());
        let stats = player.last_update().unwrap();
        assert_eq!(stats.moves_processed, 2);
        // first after-state learned 0 - 0 + 3
        assert!(player.evaluator().weights().nonzero_entries() > 0);
    }

    #[test]
    fn test_from_config_requires_weights() {
        let config = AgentConfig::parse("name=tdl").unwrap();
        assert!(matches!(
            TdPlayer::from_config(&config),
            Err(LearningError::Config(_))
        ));
    }

    #[test]
    fn test_from_config_init() {
        let config = AgentConfig::parse("name=tdl init alpha=0.5").unwrap();
        let player = TdPlayer::from_config(&config).unwrap();
        assert_eq!(player.name(), "tdl");
        assert_eq!(player.alpha(), 0.5);
        assert_eq!(player.evaluator().weights().len(), NUM_TUPLES);
        assert!(player.save_path().is_none());
        assert!(player.save().is_ok());
    }

    #[test]
    fn test_from_config_missing_load_file() {
        let config = AgentConfig::parse("init load=/nonexistent/weights.bin").unwrap();
        assert!(matches!(
            TdPlayer::from_config(&config),
            Err(LearningError::Io(_))
        ));
    }
}
