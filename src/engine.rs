//! Engine facade.
//!
//! Owns the configuration, the random number generator and the searchers,
//! and exposes the two operations a game loop needs: choosing a move for
//! the player to move and applying a move to a state.

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::board::{GameState, Move};
use crate::config::{ConfigError, EngineConfig, SearchMode, TieBreak};
use crate::resolve::{apply_move, MoveError};
use crate::search::{MaxN, Mcts, MctsTieBreaker, TieBreaker, UniformTieBreaker};

/// Move-selection engine for one seat (or several; it keeps no per-player state).
pub struct Engine {
    config: EngineConfig,
    rng: SmallRng,
    maxn: MaxN,
    mcts: Mcts,
}

impl Engine {
    /// Builds an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let tie_breaker: Box<dyn TieBreaker> = match config.tie_break {
            TieBreak::Mcts => Box::new(MctsTieBreaker::new(config.mcts)),
            TieBreak::Uniform => Box::new(UniformTieBreaker),
        };
        let maxn = MaxN::new(
            config.heuristic.clone(),
            config.depth_table.clone(),
            tie_breaker,
        );
        let mcts = Mcts::new(config.mcts);

        Ok(Engine {
            config,
            rng,
            maxn,
            mcts,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Chooses a move for the player to move in `state`.
    ///
    /// A player with no pieces on the board passes without searching.
    pub fn choose_move(&mut self, state: &GameState) -> Move {
        let player = state.to_move();
        if state.count(player) == 0 {
            debug!("{} has no pieces on the board, passing", player);
            return Move::Pass;
        }

        match self.config.mode {
            SearchMode::Hybrid => self.maxn.find(state, &mut self.rng).mv,
            SearchMode::Mcts => self.mcts.search(state, &mut self.rng).mv,
        }
    }

    /// Applies `mv` for the player to move, rejecting illegal moves.
    pub fn apply_transition(&self, state: &GameState, mv: Move) -> Result<GameState, MoveError> {
        apply_move(state, mv)
    }
}
