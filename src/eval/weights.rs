//! Weight selection for the heuristic evaluator.
//!
//! The evaluated player's situation in the prior state picks one row of
//! the bracket table. Two situations override the table: a player about to
//! finish (three exits, more than one piece left) plays the closing weights,
//! and a player behind any opponent in total pieces plays the trailing
//! weights.

use crate::board::{GameState, Player, PIECES_PER_PLAYER};
use crate::config::{HeuristicConfig, SignalWeights};

/// Which rule produced a weight set, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightSource {
    Closing,
    Trailing,
    Bracket(usize),
}

/// Picks the weights for `player` given the state before the evaluated plies.
pub fn select_weights(
    config: &HeuristicConfig,
    prior: &GameState,
    player: Player,
) -> (SignalWeights, WeightSource) {
    if is_closing(prior, player) {
        return (config.closing, WeightSource::Closing);
    }
    if is_trailing(prior, player) {
        return (config.trailing, WeightSource::Trailing);
    }

    let total = prior.total(player);
    let index = config
        .brackets
        .iter()
        .position(|b| b.max_total.map_or(true, |max| total <= max))
        .unwrap_or(config.brackets.len().saturating_sub(1));
    match config.brackets.get(index) {
        Some(bracket) => (bracket.weights, WeightSource::Bracket(index)),
        None => (config.trailing, WeightSource::Trailing),
    }
}

/// One piece short of winning with at least two pieces still to bring home.
fn is_closing(state: &GameState, player: Player) -> bool {
    state.exited(player) == PIECES_PER_PLAYER - 1 && state.count(player) > 1
}

fn is_trailing(state: &GameState, player: Player) -> bool {
    let own = state.total(player);
    player.opponents().iter().any(|&o| state.total(o) > own)
}
