//! Search and planning.
//!
//! MaxN explores a few plies with the heuristic evaluator and hands root
//! ties to a [`TieBreaker`]; MCTS runs either as that tie breaker or on its
//! own.

pub mod maxn;
pub mod mcts;
pub mod tiebreak;
pub mod tree;

pub use maxn::{MaxN, SearchResult};
pub use mcts::{rollout_reward, Mcts, MctsResult};
pub use tiebreak::{Candidate, MctsTieBreaker, TieBreaker, UniformTieBreaker};
pub use tree::{uct_value, MctsNode, MctsTree, NodeId};
