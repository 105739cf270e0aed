//! Training statistics logging.
//!
//! Batch statistics are computed every `log_interval` episodes and written through
//! the `log` facade. When a log directory is configured, the same lines are
//! appended with timestamps to `training_YYYYMMDD_HHMMSS.log`.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;

use crate::board::face_value;
use crate::learning::LearningError;

/// Default batch log interval (1,000 episodes).
pub const DEFAULT_BATCH_INTERVAL: u64 = 1_000;

/// Outcome of one episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EpisodeResult {
    /// Board score at the end of the episode
    pub score: u64,
    /// Sum of slide rewards
    pub total_reward: u64,
    /// Player moves made
    pub moves: usize,
    /// Highest rank on the final board
    pub max_rank: u8,
}

/// Statistics over one batch of episodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchStats {
    /// Total episodes completed so far
    pub episodes_completed: u64,
    /// Episodes in this batch
    pub batch_size: usize,
    /// Mean final score
    pub avg_score: f64,
    /// Best final score
    pub max_score: u64,
    /// Mean moves per episode
    pub avg_moves: f64,
    /// Elapsed time since training start
    pub elapsed_secs: f64,
    /// Episodes per second over the whole run
    pub episodes_per_sec: f64,
    /// `(rank, share of episodes whose max rank is >= rank)`, ascending rank
    pub reach_rates: Vec<(u8, f64)>,
}

impl BatchStats {
    /// Compute batch statistics.
    ///
    /// # Examples
    ///
    /// ```
    /// use tdl2048::learning::{BatchStats, EpisodeResult};
    ///
    /// let episodes = [
    ///     EpisodeResult { score: 30, total_reward: 60, moves: 40, max_rank: 5 },
    ///     EpisodeResult { score: 90, total_reward: 150, moves: 80, max_rank: 6 },
    /// ];
    /// let stats = BatchStats::from_episodes(2, &episodes, 1.0);
    /// assert_eq!(stats.avg_score, 60.0);
    /// assert_eq!(stats.reach_rates, vec![(5, 1.0), (6, 0.5)]);
    /// ```
    pub fn from_episodes(episodes_completed: u64, episodes: &[EpisodeResult], elapsed_secs: f64) -> Self {
        if episodes.is_empty() {
            return Self {
                episodes_completed,
                elapsed_secs,
                ..Self::default()
            };
        }

        let n = episodes.len() as f64;
        let avg_score = episodes.iter().map(|e| e.score as f64).sum::<f64>() / n;
        let avg_moves = episodes.iter().map(|e| e.moves as f64).sum::<f64>() / n;
        let max_score = episodes.iter().map(|e| e.score).max().unwrap_or(0);

        let lowest = episodes.iter().map(|e| e.max_rank).min().unwrap_or(0);
        let highest = episodes.iter().map(|e| e.max_rank).max().unwrap_or(0);
        let reach_rates = (lowest..=highest)
            .map(|rank| {
                let reached = episodes.iter().filter(|e| e.max_rank >= rank).count();
                (rank, reached as f64 / n)
            })
            .collect();

        let episodes_per_sec = if elapsed_secs > 0.0 {
            episodes_completed as f64 / elapsed_secs
        } else {
            0.0
        };

        Self {
            episodes_completed,
            batch_size: episodes.len(),
            avg_score,
            max_score,
            avg_moves,
            elapsed_secs,
            episodes_per_sec,
            reach_rates,
        }
    }

    /// Summary line.
    pub fn summary(&self) -> String {
        format!(
            "BATCH {:>8} | avg:{:>10.1} | max:{:>8} | moves:{:>7.1} | {:.1} ep/s | {:.1}s",
            self.episodes_completed,
            self.avg_score,
            self.max_score,
            self.avg_moves,
            self.episodes_per_sec,
            self.elapsed_secs
        )
    }

    /// One line per reached tile: face value, cumulative and exact share.
    pub fn reach_lines(&self) -> Vec<String> {
        self.reach_rates
            .iter()
            .enumerate()
            .map(|(i, &(rank, rate))| {
                let next = self.reach_rates.get(i + 1).map_or(0.0, |&(_, r)| r);
                format!(
                    "\t{:>6}\t{:>6.2}%\t({:.2}%)",
                    face_value(rank),
                    rate * 100.0,
                    (rate - next) * 100.0
                )
            })
            .collect()
    }
}

/// Synchronous training logger.
#[derive(Debug)]
pub struct TrainingLogger {
    writer: Option<BufWriter<File>>,
    log_path: Option<PathBuf>,
    start_time: Instant,
}

impl TrainingLogger {
    /// Logger writing only through the `log` facade.
    pub fn console() -> Self {
        Self {
            writer: None,
            log_path: None,
            start_time: Instant::now(),
        }
    }

    /// Logger that also appends to a timestamped file in `log_dir`.
    ///
    /// # Errors
    ///
    /// `LearningError::Io` if the directory or file cannot be created.
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Result<Self, LearningError> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("training_{}.log", timestamp));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let mut logger = Self {
            writer: Some(BufWriter::new(file)),
            log_path: Some(log_path),
            start_time: Instant::now(),
        };
        logger.log_info("Training logger initialized");
        Ok(logger)
    }

    /// Path of the log file, if any.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Seconds since the logger was created.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn log_info(&mut self, message: &str) {
        log::info!("{}", message);
        self.write_line(&format!("INFO {}", message));
    }

    pub fn log_warning(&mut self, message: &str) {
        log::warn!("{}", message);
        self.write_line(&format!("WARN {}", message));
    }

    /// Log a batch summary and its tile reach table.
    pub fn log_batch(&mut self, stats: &BatchStats) {
        let summary = stats.summary();
        log::info!("{}", summary);
        self.write_line(&summary);
        for line in stats.reach_lines() {
            log::info!("{}", line);
            self.write_line(&line);
        }
    }

    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut()
            && let Err(e) = writer.flush()
        {
            log::warn!("Failed to flush training log: {}", e);
        }
    }

    fn write_line(&mut self, line: &str) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        if let Err(e) = writeln!(writer, "[{}] {}", timestamp, line) {
            log::warn!("Failed to write training log: {}", e);
        }
    }
}

impl Drop for TrainingLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn episode(score: u64, moves: usize, max_rank: u8) -> EpisodeResult {
        EpisodeResult {
            score,
            total_reward: 0,
            moves,
            max_rank,
        }
    }

    #[test]
    fn test_batch_stats_empty() {
        let stats = BatchStats::from_episodes(10, &[], 2.0);
        assert_eq!(stats.episodes_completed, 10);
        assert_eq!(stats.batch_size, 0);
        assert!(stats.reach_rates.is_empty());
    }

    #[test]
    fn test_batch_stats_values() {
        let episodes = [episode(10, 20, 4), episode(20, 40, 6), episode(60, 90, 6)];
        let stats = BatchStats::from_episodes(300, &episodes, 100.0);

        assert_eq!(stats.batch_size, 3);
        assert_eq!(stats.avg_score, 30.0);
        assert_eq!(stats.max_score, 60);
        assert_eq!(stats.avg_moves, 50.0);
        assert_eq!(stats.episodes_per_sec, 3.0);
        assert_eq!(stats.reach_rates.len(), 3);
        assert_eq!(stats.reach_rates[0], (4, 1.0));
        assert_eq!(stats.reach_rates[2].0, 6);
        assert!((stats.reach_rates[2].1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_reach_lines_show_face_values() {
        let stats = BatchStats::from_episodes(2, &[episode(0, 1, 3), episode(0, 1, 4)], 1.0);
        let lines = stats.reach_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("3"));
        assert!(lines[0].contains("100.00%"));
        assert!(lines[1].contains("6"));
        assert!(lines[1].contains("50.00%"));
    }

    #[test]
    fn test_file_logger_writes_batches() {
        let dir = tempdir().unwrap();
        let mut logger = TrainingLogger::new(dir.path()).unwrap();
        let path = logger.log_path().unwrap().to_path_buf();

        logger.log_batch(&BatchStats::from_episodes(1, &[episode(9, 5, 4)], 0.5));
        logger.log_warning("something odd");
        logger.flush();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Training logger initialized"));
        assert!(content.contains("BATCH"));
        assert!(content.contains("WARN something odd"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("training_") && name.ends_with(".log"));
    }

    #[test]
    fn test_console_logger_has_no_file() {
        let mut logger = TrainingLogger::console();
        logger.log_info("hello");
        assert!(logger.log_path().is_none());
    }
}
