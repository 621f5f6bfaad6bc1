//! Board representation and game-state types.
//!
//! Contains the hex geometry, players, moves, and the overall game state.

pub mod action;
pub mod hex;
pub mod player;
pub mod state;

pub use action::Move;
pub use hex::{board, iter_cells, Board, Cell, BOARD, CELL_COUNT, DIRECTIONS, RADIUS};
pub use player::{Player, ALL_PLAYERS, PIECES_PER_PLAYER, PLAYER_COUNT, TOTAL_PIECES};
pub use state::GameState;
