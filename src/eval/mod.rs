//! Position evaluation.
//!
//! Tiered heuristic evaluation driven by the weight tables in
//! [`HeuristicConfig`](crate::config::HeuristicConfig).

pub mod heuristic;
pub mod weights;

pub use heuristic::{evaluate, paranoid_adjustment, Signals};
pub use weights::{select_weights, WeightSource};
