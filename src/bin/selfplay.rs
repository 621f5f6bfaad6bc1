//! Self-play game generation CLI.
//!
//! Plays Chexers games with the engine in every seat and writes one JSON
//! record per game (JSONL) to stdout or a file. Progress goes to the log.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use flexi_logger::Logger;

use chexers::config::{EngineConfig, SearchBudget, SearchMode, TieBreak};
use chexers::selfplay::{self, SelfPlayConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Hybrid,
    Mcts,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TieBreakArg {
    Mcts,
    Uniform,
}

#[derive(Parser, Debug)]
#[command(name = "selfplay", about = "Play Chexers engine self-play games")]
struct Args {
    /// Number of games to play
    #[arg(short, long, default_value_t = 10)]
    games: usize,

    /// Engine configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search mode, overriding the config file
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Tie-break strategy, overriding the config file
    #[arg(long, value_enum)]
    tie_break: Option<TieBreakArg>,

    /// MCTS time budget per search in milliseconds
    #[arg(long, conflicts_with = "iterations")]
    movetime: Option<u64>,

    /// MCTS iteration budget per search
    #[arg(long)]
    iterations: Option<u32>,

    /// Turns per player before a game is drawn
    #[arg(long, default_value_t = 256)]
    max_turns: u32,

    /// Number of parallel threads
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Random seed, 0 for entropy
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn engine_config(&self) -> Result<EngineConfig, Box<dyn std::error::Error>> {
        let mut engine = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(mode) = self.mode {
            engine.mode = match mode {
                ModeArg::Hybrid => SearchMode::Hybrid,
                ModeArg::Mcts => SearchMode::Mcts,
            };
        }
        if let Some(tie_break) = self.tie_break {
            engine.tie_break = match tie_break {
                TieBreakArg::Mcts => TieBreak::Mcts,
                TieBreakArg::Uniform => TieBreak::Uniform,
            };
        }
        if let Some(ms) = self.movetime {
            engine.mcts.budget = SearchBudget::TimeMs(ms);
        }
        if let Some(n) = self.iterations {
            engine.mcts.budget = SearchBudget::Iterations(n);
        }
        engine.validate()?;
        Ok(engine)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    Logger::try_with_env_or_str("info")?
        .format(flexi_logger::default_format)
        .start()?;

    let args = Args::parse();
    let config = SelfPlayConfig {
        num_games: args.games,
        engine: args.engine_config()?,
        max_turns_per_player: args.max_turns,
        threads: args.threads.max(1),
        seed: args.seed,
        ..SelfPlayConfig::default()
    };

    log::info!(
        "self-play: {} games, mode {:?}, budget {:?}, {} threads",
        config.num_games,
        config.engine.mode,
        config.engine.mcts.budget,
        config.threads
    );

    let mut out: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let start = Instant::now();
    let mut games = Vec::with_capacity(config.num_games);
    selfplay::run_self_play_with_callback(&config, |game| {
        selfplay::write_game_jsonl(&game, &mut out)?;
        games.push(game);
        Ok(())
    })?;
    out.flush()?;
    let elapsed = start.elapsed();

    log::info!(
        "completed {} games in {:.1}s",
        games.len(),
        elapsed.as_secs_f64()
    );
    selfplay::log_summary(&selfplay::summarize(&games));
    if let Some(path) = &args.output {
        log::info!("wrote {} games to {}", games.len(), path.display());
    }
    Ok(())
}
