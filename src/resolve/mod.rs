//! Move resolution.
//!
//! Applies moves to game states, producing the successor state.

pub mod transition;

pub use transition::{apply_move, apply_unchecked, validate, MoveError};
