//! Chexers engine library.
//!
//! Move selection for three-player Chexers: board model, move generation,
//! state transition, heuristic evaluation, MaxN and MCTS search, and a
//! self-play harness used by the `selfplay` binary and the tests.

pub mod board;
pub mod config;
pub mod engine;
pub mod eval;
pub mod movegen;
pub mod resolve;
pub mod search;
pub mod selfplay;

pub use board::{Cell, GameState, Move, Player};
pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use resolve::MoveError;
