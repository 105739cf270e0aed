//! TD(0) learning over episode trajectories.
//!
//! # Overview
//!
//! - **Trajectory**: after-state tuple indices and move rewards of one episode
//! - **TD Learner**: backward TD(0) pass applied when the episode ends
//! - **Checkpoint**: weight-table persistence
//! - **Logger**: episode statistics
//! - **Training Engine**: player/environment episode loop
//!
//! # Architecture
//!
//! ```text
//! TrainingEngine
//!     |-- TdPlayer
//!     |       |-- Evaluator (weights)
//!     |       |-- Trajectory
//!     |       |-- TDLearner
//!     |-- RandomEnvironment (tile bag, RNG)
//!     |-- TrainingLogger
//!     |-- checkpoint (save/load)
//! ```

use thiserror::Error;

use crate::config::ConfigError;

pub mod checkpoint;
pub mod logger;
pub mod td_learner;
pub mod training_engine;
pub mod trajectory;

pub use checkpoint::{load_weights, read_weights, save_weights, write_weights};
pub use error::LearningError;
pub use logger::{BatchStats, DEFAULT_BATCH_INTERVAL, EpisodeResult, TrainingLogger};
pub use td_learner::{DEFAULT_ALPHA, TDLearner, TDUpdateStats};
pub use training_engine::{
    DEFAULT_INITIAL_TILES, TrainingConfig, TrainingEngine, TrainingStats, play_episode,
};
pub use trajectory::{AfterstateRecord, Trajectory};

mod error {
    use super::*;

    /// Learning system error type
    ///
    /// | Variant | Recovery |
    /// |---------|----------|
    /// | `Io` | Fatal in the binary (process exit) |
    /// | `InvalidWeights` | Report, start from `init` instead |
    /// | `Config` | Report configuration issue, abort |
    #[derive(Error, Debug)]
    pub enum LearningError {
        /// I/O errors (weight files, log files)
        #[error("I/O error: {0}")]
        Io(#[from] std::io::Error),

        /// Weight file is truncated, malformed, or does not fit the network
        #[error("Invalid weights: {0}")]
        InvalidWeights(String),

        /// Agent configuration problem
        #[error("Configuration error: {0}")]
        Config(String),
    }

    impl From<ConfigError> for LearningError {
        fn from(err: ConfigError) -> Self {
            LearningError::Config(err.to_string())
        }
    }
}
