//! Self-play game generation.
//!
//! Plays complete games with one engine choosing moves for all three
//! players, and records every turn. Games end when a player has exited all
//! four pieces, when every player has taken the maximum number of turns, or
//! when the same position (including the player to move) occurs for the
//! fourth time.

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{GameState, Move, Player, ALL_PLAYERS, PLAYER_COUNT};
use crate::config::{ConfigError, EngineConfig};
use crate::engine::Engine;
use crate::resolve::MoveError;

/// Errors that abort a self-play run.
#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("game {game_id}: engine chose an illegal move {mv}: {source}")]
    IllegalMove {
        game_id: usize,
        mv: Move,
        #[source]
        source: MoveError,
    },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write game records: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Engine settings shared by all seats.
    pub engine: EngineConfig,
    /// Turns each player may take before the game is drawn.
    pub max_turns_per_player: u32,
    /// Occurrences of one position that draw the game.
    pub repetition_limit: u32,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Base random seed (0 = use the engine config's seed, or entropy).
    pub seed: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            engine: EngineConfig::default(),
            max_turns_per_player: 256,
            repetition_limit: 4,
            threads: 4,
            seed: 0,
        }
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "player")]
pub enum GameOutcome {
    Win(Player),
    TurnLimit,
    Repetition,
}

impl GameOutcome {
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameOutcome::Win(p) => Some(*p),
            _ => None,
        }
    }
}

/// One move of a recorded game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub ply: u32,
    pub player: Player,
    #[serde(rename = "move")]
    pub mv: Move,
    /// Exited counts after the move, indexed by player.
    pub exited: [u8; PLAYER_COUNT],
    /// On-board counts after the move, indexed by player.
    pub on_board: [u8; PLAYER_COUNT],
}

/// A complete self-play game record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub outcome: GameOutcome,
    pub plies: u32,
    pub final_exited: [u8; PLAYER_COUNT],
    pub final_on_board: [u8; PLAYER_COUNT],
    pub elapsed_ms: u64,
    pub turns: Vec<TurnRecord>,
}

fn counts(state: &GameState) -> ([u8; PLAYER_COUNT], [u8; PLAYER_COUNT]) {
    (
        ALL_PLAYERS.map(|p| state.exited(p)),
        ALL_PLAYERS.map(|p| state.count(p)),
    )
}

/// Engine settings for one game: a non-zero base seed gives every game its
/// own reproducible seed.
fn engine_config_for(config: &SelfPlayConfig, game_id: usize) -> EngineConfig {
    let mut engine = config.engine.clone();
    if config.seed != 0 {
        engine.seed = Some(config.seed.wrapping_add(game_id as u64));
    }
    engine
}

/// Plays a single game from the initial position.
pub fn play_game(config: &SelfPlayConfig, game_id: usize) -> Result<GameRecord, SelfPlayError> {
    let start = Instant::now();
    let mut engine = Engine::new(engine_config_for(config, game_id))?;
    let max_plies = config.max_turns_per_player * PLAYER_COUNT as u32;

    let mut state = GameState::initial();
    let mut seen: HashMap<GameState, u32> = HashMap::new();
    seen.insert(state, 1);
    let mut turns = Vec::new();
    let mut plies = 0u32;

    let outcome = loop {
        if let Some(winner) = state.winner() {
            break GameOutcome::Win(winner);
        }
        if plies >= max_plies {
            break GameOutcome::TurnLimit;
        }

        let player = state.to_move();
        let mv = engine.choose_move(&state);
        state = engine
            .apply_transition(&state, mv)
            .map_err(|source| SelfPlayError::IllegalMove {
                game_id,
                mv,
                source,
            })?;
        plies += 1;

        let (exited, on_board) = counts(&state);
        turns.push(TurnRecord {
            ply: plies,
            player,
            mv,
            exited,
            on_board,
        });

        let occurrences = seen.entry(state).or_insert(0);
        *occurrences += 1;
        if *occurrences >= config.repetition_limit {
            break GameOutcome::Repetition;
        }
    };

    let (final_exited, final_on_board) = counts(&state);
    Ok(GameRecord {
        game_id,
        outcome,
        plies,
        final_exited,
        final_on_board,
        elapsed_ms: start.elapsed().as_millis() as u64,
        turns,
    })
}

fn describe(outcome: GameOutcome) -> String {
    match outcome {
        GameOutcome::Win(p) => format!("{} wins", p),
        GameOutcome::TurnLimit => "draw (turn limit)".to_string(),
        GameOutcome::Repetition => "draw (repetition)".to_string(),
    }
}

/// Runs self-play generation, producing multiple game records.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, SelfPlayError> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| {
        games.push(game);
        Ok(())
    })?;
    games.sort_by_key(|g| g.game_id);
    Ok(games)
}

/// Runs self-play generation, calling `on_game` with each completed game.
///
/// Games reach the callback in completion order. The first error, from a
/// game or from the callback, stops the run.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) -> Result<(), SelfPlayError> + Send,
{
    config.engine.validate()?;
    if config.threads > 1 {
        run_self_play_parallel(config, on_game)
    } else {
        run_self_play_sequential(config, on_game)
    }
}

fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) -> Result<(), SelfPlayError>,
{
    for i in 0..config.num_games {
        let game = play_game(config, i)?;
        info!(
            "game {}/{}: {} after {} plies ({} ms)",
            i + 1,
            config.num_games,
            describe(game.outcome),
            game.plies,
            game.elapsed_ms
        );
        on_game(game)?;
    }
    Ok(())
}

/// Plays games on a rayon pool and delivers them to the callback on the
/// calling thread.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, mut on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) -> Result<(), SelfPlayError> + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<GameRecord, SelfPlayError>>();
    let config_clone = config.clone();
    let handle = std::thread::spawn(move || {
        pool.install(|| {
            (0..config_clone.num_games)
                .into_par_iter()
                .for_each_with(tx, |tx, i| {
                    let result = play_game(&config_clone, i);
                    if let Ok(game) = &result {
                        let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        info!(
                            "game {}/{}: {} after {} plies ({} ms)",
                            n,
                            config_clone.num_games,
                            describe(game.outcome),
                            game.plies,
                            game.elapsed_ms
                        );
                    }
                    let _ = tx.send(result);
                });
        });
    });

    let mut first_error = None;
    for result in rx {
        if first_error.is_some() {
            continue;
        }
        if let Err(e) = result.and_then(&mut on_game) {
            first_error = Some(e);
        }
    }
    if handle.join().is_err() {
        log::error!("self-play worker thread panicked");
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Writes one game record as a JSON line.
pub fn write_game_jsonl<W: Write>(game: &GameRecord, out: &mut W) -> Result<(), SelfPlayError> {
    serde_json::to_writer(&mut *out, game).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> Result<(), SelfPlayError> {
    for game in games {
        write_game_jsonl(game, out)?;
    }
    out.flush()?;
    Ok(())
}

/// Aggregate results of a batch of games.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub games: usize,
    pub wins: [usize; PLAYER_COUNT],
    pub turn_limit_draws: usize,
    pub repetition_draws: usize,
    pub avg_plies: f64,
}

/// Tallies outcomes over `games`.
pub fn summarize(games: &[GameRecord]) -> Summary {
    let mut summary = Summary {
        games: games.len(),
        ..Summary::default()
    };
    let mut plies = 0u64;
    for game in games {
        plies += game.plies as u64;
        match game.outcome {
            GameOutcome::Win(p) => summary.wins[p.index()] += 1,
            GameOutcome::TurnLimit => summary.turn_limit_draws += 1,
            GameOutcome::Repetition => summary.repetition_draws += 1,
        }
    }
    summary.avg_plies = plies as f64 / games.len().max(1) as f64;
    summary
}

/// Logs a summary of self-play results.
pub fn log_summary(summary: &Summary) {
    info!("=== Self-Play Summary ===");
    info!("Games: {}", summary.games);
    info!("Avg plies/game: {:.1}", summary.avg_plies);
    for p in ALL_PLAYERS {
        info!("{} wins: {}", p, summary.wins[p.index()]);
    }
    info!(
        "Draws: {} (turn limit {}, repetition {})",
        summary.turn_limit_draws + summary.repetition_draws,
        summary.turn_limit_draws,
        summary.repetition_draws
    );
}
