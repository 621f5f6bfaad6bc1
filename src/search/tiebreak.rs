//! Resolving ties between equally scored root moves.
//!
//! MaxN often finds several root moves with the same best score. The
//! installed `TieBreaker` picks one of them.

use log::debug;
use rand::{Rng, RngCore};

use crate::board::{GameState, Move};
use crate::config::MctsConfig;

use super::mcts::Mcts;

/// A tied root move and the state it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub mv: Move,
    pub state: GameState,
}

/// Chooses among tied root moves. Returns an index into `candidates`,
/// which is never empty.
pub trait TieBreaker {
    fn break_tie(&mut self, root: &GameState, candidates: &[Candidate], rng: &mut dyn RngCore)
        -> usize;
}

/// Runs a budget-bounded MCTS restricted to the tied moves.
#[derive(Debug, Clone)]
pub struct MctsTieBreaker {
    mcts: Mcts,
}

impl MctsTieBreaker {
    pub fn new(config: MctsConfig) -> Self {
        MctsTieBreaker {
            mcts: Mcts::new(config),
        }
    }
}

impl TieBreaker for MctsTieBreaker {
    fn break_tie(
        &mut self,
        root: &GameState,
        candidates: &[Candidate],
        rng: &mut dyn RngCore,
    ) -> usize {
        let result = self.mcts.search_candidates(root, candidates, rng);
        debug!(
            "tie of {} broken by mcts: {} after {} dives",
            candidates.len(),
            result.mv,
            result.dives
        );
        result.index
    }
}

/// Picks a tied move uniformly at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformTieBreaker;

impl TieBreaker for UniformTieBreaker {
    fn break_tie(
        &mut self,
        _root: &GameState,
        candidates: &[Candidate],
        rng: &mut dyn RngCore,
    ) -> usize {
        rng.gen_range(0..candidates.len().max(1))
    }
}
