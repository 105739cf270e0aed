//! Training Engine: player versus environment episode loop.
//!
//! # Episode
//!
//! 1. Empty board; the environment places `initial_tiles` tiles anywhere.
//! 2. The player slides, then the environment places one tile on the edge the
//!    slide moved away from. Repeat.
//! 3. When the player has no legal slide it learns from the episode and returns
//!    `Action::None`; the episode ends.
//!
//! Episodes run sequentially on one thread. SIGINT/SIGTERM stops training after
//! the episode in flight; the weights are then saved if a `save=` path is set.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::action::Action;
use crate::board::Board;
use crate::environment::RandomEnvironment;
use crate::learning::LearningError;
use crate::learning::logger::{BatchStats, DEFAULT_BATCH_INTERVAL, EpisodeResult, TrainingLogger};
use crate::player::TdPlayer;

/// Tiles placed before the first player move.
pub const DEFAULT_INITIAL_TILES: usize = 9;

/// Result type for signal handler setup
type SignalHandlerResult = Result<Arc<AtomicBool>, String>;

/// Process-wide interrupt flag; the handler can only be registered once.
static GLOBAL_INTERRUPTED: OnceLock<Mutex<SignalHandlerResult>> = OnceLock::new();

/// Register the SIGINT/SIGTERM handler once and return its flag.
fn setup_signal_handler() -> Result<Arc<AtomicBool>, LearningError> {
    let result_mutex = GLOBAL_INTERRUPTED.get_or_init(|| {
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = Arc::clone(&flag);

        let result = ctrlc::set_handler(move || {
            flag_clone.store(true, Ordering::SeqCst);
        })
        .map(|_| flag)
        .map_err(|e| format!("Failed to set signal handler: {}", e));

        Mutex::new(result)
    });

    let guard = result_mutex
        .lock()
        .map_err(|_| LearningError::Config("Signal handler mutex poisoned".to_string()))?;
    match &*guard {
        Ok(flag) => Ok(Arc::clone(flag)),
        Err(e) => Err(LearningError::Config(e.clone())),
    }
}

/// Training configuration.
#[derive(Clone, Debug)]
pub struct TrainingConfig {
    /// Episodes to play.
    pub total_episodes: u64,
    /// Episodes between batch logs (0 disables).
    pub log_interval: u64,
    /// Episodes between intermediate weight saves (None disables).
    pub save_interval: Option<u64>,
    /// Tiles placed before the first move.
    pub initial_tiles: usize,
    /// Directory for the training log file (None logs to the console only).
    pub log_dir: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            total_episodes: 1_000,
            log_interval: DEFAULT_BATCH_INTERVAL,
            save_interval: None,
            initial_tiles: DEFAULT_INITIAL_TILES,
            log_dir: None,
        }
    }
}

/// Training statistics summary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingStats {
    /// Episodes completed.
    pub episodes_completed: u64,
    /// Total elapsed time in seconds.
    pub elapsed_secs: f64,
    /// Mean final score over all episodes.
    pub avg_score: f64,
    /// Best final score.
    pub max_score: u64,
    /// Whether training stopped on a signal.
    pub interrupted: bool,
}

/// Play one full episode and let the player learn from it.
pub fn play_episode(
    player: &mut TdPlayer,
    environment: &mut RandomEnvironment,
    initial_tiles: usize,
) -> EpisodeResult {
    let mut board = Board::new();

    for _ in 0..initial_tiles {
        if environment.take_action(&board, None).apply(&mut board).is_none() {
            break;
        }
    }

    let mut moves = 0;
    let mut total_reward: u64 = 0;

    loop {
        let action = player.take_action(&board);
        let Action::Slide(dir) = action else {
            break;
        };
        let Some(reward) = action.apply(&mut board) else {
            log::error!("Player chose illegal slide {} on\n{}", dir, board);
            player.finish_episode();
            break;
        };
        moves += 1;
        total_reward += reward as u64;

        // a legal slide always frees a cell on the trailing edge
        environment
            .take_action(&board, Some(dir))
            .apply(&mut board);
    }

    EpisodeResult {
        score: board.score(),
        total_reward,
        moves,
        max_rank: board.max_rank(),
    }
}

/// Main training loop.
pub struct TrainingEngine {
    player: TdPlayer,
    environment: RandomEnvironment,
    logger: TrainingLogger,
    config: TrainingConfig,
    episodes_completed: u64,
    batch: Vec<EpisodeResult>,
    score_sum: f64,
    max_score: u64,
    interrupted: Arc<AtomicBool>,
}

impl TrainingEngine {
    /// Initialize the engine and register the interrupt handler.
    ///
    /// # Errors
    ///
    /// - `LearningError::Io` if the log directory cannot be created
    /// - `LearningError::Config` if the signal handler cannot be installed
    pub fn new(
        config: TrainingConfig,
        player: TdPlayer,
        environment: RandomEnvironment,
    ) -> Result<Self, LearningError> {
        let interrupted = setup_signal_handler()?;
        Self::with_interrupt_flag(config, player, environment, interrupted)
    }

    /// Initialize the engine with a caller-owned stop flag.
    pub fn with_interrupt_flag(
        config: TrainingConfig,
        player: TdPlayer,
        environment: RandomEnvironment,
        interrupted: Arc<AtomicBool>,
    ) -> Result<Self, LearningError> {
        let logger = match &config.log_dir {
            Some(dir) => TrainingLogger::new(dir)?,
            None => TrainingLogger::console(),
        };

        Ok(Self {
            player,
            environment,
            logger,
            batch: Vec::with_capacity(config.log_interval.min(100_000) as usize),
            config,
            episodes_completed: 0,
            score_sum: 0.0,
            max_score: 0,
            interrupted,
        })
    }

    /// Play `total_episodes` episodes, or until interrupted.
    ///
    /// # Errors
    ///
    /// `LearningError::Io` if saving the weights fails.
    pub fn train(&mut self) -> Result<TrainingStats, LearningError> {
        self.logger.log_info(&format!(
            "Training {} for {} episodes (alpha={}, initial tiles={})",
            self.player.name(),
            self.config.total_episodes,
            self.player.alpha(),
            self.config.initial_tiles
        ));

        let mut interrupted = false;
        while self.episodes_completed < self.config.total_episodes {
            if self.interrupted.load(Ordering::SeqCst) {
                self.logger
                    .log_warning("Interrupt received, stopping after current episode");
                interrupted = true;
                break;
            }

            let result = play_episode(
                &mut self.player,
                &mut self.environment,
                self.config.initial_tiles,
            );
            self.record(result);

            if let Some(every) = self.config.save_interval
                && every > 0
                && self.episodes_completed % every == 0
            {
                self.player.save()?;
            }
        }

        if !self.batch.is_empty() {
            self.flush_batch();
        }
        self.player.save()?;
        self.logger.flush();

        Ok(self.stats(interrupted))
    }

    fn record(&mut self, result: EpisodeResult) {
        self.episodes_completed += 1;
        self.score_sum += result.score as f64;
        self.max_score = self.max_score.max(result.score);
        self.batch.push(result);

        if self.config.log_interval > 0
            && self.episodes_completed % self.config.log_interval == 0
        {
            self.flush_batch();
        }
    }

    fn flush_batch(&mut self) {
        let stats = BatchStats::from_episodes(
            self.episodes_completed,
            &self.batch,
            self.logger.elapsed_secs(),
        );
        self.logger.log_batch(&stats);
        self.batch.clear();
    }

    fn stats(&self, interrupted: bool) -> TrainingStats {
        TrainingStats {
            episodes_completed: self.episodes_completed,
            elapsed_secs: self.logger.elapsed_secs(),
            avg_score: if self.episodes_completed > 0 {
                self.score_sum / self.episodes_completed as f64
            } else {
                0.0
            },
            max_score: self.max_score,
            interrupted,
        }
    }

    pub fn player(&self) -> &TdPlayer {
        &self.player
    }

    pub fn into_player(self) -> TdPlayer {
        self.player
    }

    pub fn episodes_completed(&self) -> u64 {
        self.episodes_completed
    }
}
