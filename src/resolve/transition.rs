//! State transition: applying one move to a game state.
//!
//! `apply_move` validates a move against the rules before applying it and
//! is the entry point for externally supplied moves. Search code applies
//! moves it generated itself through `apply_unchecked`.

use thiserror::Error;

use crate::board::{board, Cell, GameState, Move, Player, DIRECTIONS};
use crate::movegen::has_non_pass_move;

/// Reasons a move cannot be applied to a state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("cell {0} is not on the board")]
    OffBoard(Cell),

    #[error("{player} has no piece at {cell}")]
    NotOwned { player: Player, cell: Cell },

    #[error("destination {0} is occupied")]
    Occupied(Cell),

    #[error("{from} -> {to} is not a single step")]
    NotAdjacent { from: Cell, to: Cell },

    #[error("{from} -> {to} is not a straight two-cell jump")]
    NotAJump { from: Cell, to: Cell },

    #[error("no piece to jump over at {0}")]
    NothingToJump(Cell),

    #[error("{player} cannot exit from {cell}")]
    NotInGoal { player: Player, cell: Cell },

    #[error("{0} cannot pass while other moves are available")]
    IllegalPass(Player),
}

/// Applies a move after checking it is legal for the player to move.
///
/// Returns a new state; the input is never modified.
pub fn apply_move(state: &GameState, mv: Move) -> Result<GameState, MoveError> {
    validate(state, mv)?;
    Ok(apply_unchecked(state, mv))
}

/// Checks a move against the rules without applying it.
pub fn validate(state: &GameState, mv: Move) -> Result<(), MoveError> {
    let b = board();
    let player = state.to_move();

    let owned = |cell: Cell| -> Result<(), MoveError> {
        let idx = b.index_of(cell).ok_or(MoveError::OffBoard(cell))?;
        if state.pieces(player) & (1u64 << idx) == 0 {
            return Err(MoveError::NotOwned { player, cell });
        }
        Ok(())
    };
    let vacant = |cell: Cell| -> Result<(), MoveError> {
        let idx = b.index_of(cell).ok_or(MoveError::OffBoard(cell))?;
        if state.occupied() & (1u64 << idx) != 0 {
            return Err(MoveError::Occupied(cell));
        }
        Ok(())
    };

    if let Some(source) = mv.source() {
        owned(source)?;
    }

    match mv {
        Move::Move { from, to } => {
            vacant(to)?;
            if from.distance(to) != 1 {
                return Err(MoveError::NotAdjacent { from, to });
            }
        }
        Move::Jump { from, to } => {
            vacant(to)?;
            let straight = DIRECTIONS
                .iter()
                .any(|&(dq, dr)| from.q + 2 * dq == to.q && from.r + 2 * dr == to.r);
            if !straight {
                return Err(MoveError::NotAJump { from, to });
            }
            if let Some(mid) = mv.jumped_cell() {
                if state.owner(mid).is_none() {
                    return Err(MoveError::NothingToJump(mid));
                }
            }
        }
        Move::Exit { at } => {
            if !b.is_goal(player, at) {
                return Err(MoveError::NotInGoal { player, cell: at });
            }
        }
        Move::Pass => {
            if has_non_pass_move(state) {
                return Err(MoveError::IllegalPass(player));
            }
        }
    }
    Ok(())
}

/// Applies a move known to be legal and advances the turn.
///
/// A jumped piece belonging to another player is converted to the mover;
/// jumping one's own piece leaves ownership unchanged.
pub fn apply_unchecked(state: &GameState, mv: Move) -> GameState {
    let b = board();
    let mut next = *state;
    let player = state.to_move();

    match mv {
        Move::Move { from, to } => {
            if let (Some(f), Some(t)) = (b.index_of(from), b.index_of(to)) {
                next.move_piece(player, f, t);
            }
        }
        Move::Jump { from, to } => {
            if let (Some(f), Some(t)) = (b.index_of(from), b.index_of(to)) {
                next.move_piece(player, f, t);
                if let Some(m) = mv.jumped_cell().and_then(|mid| b.index_of(mid)) {
                    if let Some(owner) = state.owner_at(m) {
                        if owner != player {
                            next.convert_piece(owner, player, m);
                        }
                    }
                }
            }
        }
        Move::Exit { at } => {
            if let Some(i) = b.index_of(at) {
                next.exit_piece(player, i);
            }
        }
        Move::Pass => {}
    }

    next.advance_turn();
    next
}
