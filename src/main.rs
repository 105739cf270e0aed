use std::path::PathBuf;
use std::process;

use clap::Parser;

use tdl2048::RandomEnvironment;
use tdl2048::TdPlayer;
use tdl2048::config::AgentConfig;
use tdl2048::learning::{
    DEFAULT_BATCH_INTERVAL, DEFAULT_INITIAL_TILES, LearningError, TrainingConfig, TrainingEngine,
};

#[derive(Debug, Parser)]
#[command(name = "tdl2048", about = "Train a TD(0) n-tuple network by self-play")]
struct Args {
    /// Episodes to play
    #[arg(long, default_value_t = 1000)]
    total: u64,

    /// Episodes per statistics block
    #[arg(long, default_value_t = DEFAULT_BATCH_INTERVAL)]
    block: u64,

    /// Player options, e.g. "init save=weights.bin alpha=0.003125"
    #[arg(long, default_value = "")]
    play: String,

    /// Environment options, e.g. "seed=42"
    #[arg(long, default_value = "")]
    evil: String,

    /// Save the weights every this many episodes
    #[arg(long)]
    save_every: Option<u64>,

    /// Directory for a timestamped training log file
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Tiles placed before the first move of each episode
    #[arg(long, default_value_t = DEFAULT_INITIAL_TILES)]
    initial_tiles: usize,
}

fn run(args: Args) -> Result<(), LearningError> {
    let play = AgentConfig::parse(&format!("name=tdl role=player {}", args.play))?;
    let evil = AgentConfig::parse(&format!("name=random role=environment {}", args.evil))?;

    let player = TdPlayer::from_config(&play)?;
    let environment = RandomEnvironment::from_config(&evil);

    let config = TrainingConfig {
        total_episodes: args.total,
        log_interval: args.block,
        save_interval: args.save_every,
        initial_tiles: args.initial_tiles,
        log_dir: args.log_dir,
    };

    let mut engine = TrainingEngine::new(config, player, environment)?;
    let stats = engine.train()?;

    log::info!(
        "Finished {} episodes in {:.1}s: avg score {:.1}, max score {}{}",
        stats.episodes_completed,
        stats.elapsed_secs,
        stats.avg_score,
        stats.max_score,
        if stats.interrupted { " (interrupted)" } else { "" }
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        process::exit(1);
    }
}
