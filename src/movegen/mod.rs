//! Legal move generation.
//!
//! Enumerates the legal moves for the player to move: exits from goal
//! cells, steps to adjacent empty cells, and jumps over an adjacent piece
//! of any colour onto the empty cell beyond. `Pass` is returned only when
//! nothing else is legal.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{board, iter_cells, GameState, Move, DIRECTIONS};

/// Generates all legal moves for the player to move.
///
/// The order is deterministic for a given state: pieces in board index
/// order, and for each piece the exit first, then the six directions in
/// `DIRECTIONS` order.
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    let mut moves = Vec::with_capacity(24);
    legal_moves_into(state, &mut moves);
    moves
}

/// Like [`legal_moves`], but reuses the caller's buffer.
pub fn legal_moves_into(state: &GameState, moves: &mut Vec<Move>) {
    moves.clear();
    let b = board();
    let mover = state.to_move();
    let occupied = state.occupied();
    let goal = b.goal_mask(mover);

    for idx in iter_cells(state.pieces(mover)) {
        let from = b.cell(idx);
        if goal & (1u64 << idx) != 0 {
            moves.push(Move::Exit { at: from });
        }

        for dir in 0..DIRECTIONS.len() {
            let Some(adj) = b.neighbour(idx, dir) else {
                continue;
            };
            if occupied & (1u64 << adj) == 0 {
                moves.push(Move::Move {
                    from,
                    to: b.cell(adj),
                });
                continue;
            }
            if let Some(land) = b.neighbour(adj, dir) {
                if occupied & (1u64 << land) == 0 {
                    moves.push(Move::Jump {
                        from,
                        to: b.cell(land),
                    });
                }
            }
        }
    }

    if moves.is_empty() {
        moves.push(Move::Pass);
    }
}

/// Returns true if the player to move has any move other than `Pass`.
pub fn has_non_pass_move(state: &GameState) -> bool {
    !matches!(legal_moves(state).as_slice(), [Move::Pass])
}

/// Picks a uniformly random legal move for the player to move.
pub fn random_legal_move<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Move {
    let moves = legal_moves(state);
    moves.choose(rng).copied().unwrap_or(Move::Pass)
}
