//! Depth-limited MaxN search.
//!
//! Every ply is maximised by its own mover: each child line is scored from
//! the mover's perspective against the state at that ply, and the best
//! line is passed up. The paranoid term makes opponents favour lines that
//! cost the root player pieces.
//!
//! Nodes are materialised in an arena and link to their parent by index.
//! Once a ply has scored all of its children, their subtrees are truncated
//! off the arena, so memory grows with depth times branching rather than
//! with the full tree. Only the chosen leaf state travels upward; the root
//! move is recovered by walking parent indices from the chosen node.

use std::time::{Duration, Instant};

use log::debug;
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::board::{GameState, Move, Player};
use crate::config::{depth_for, DepthRule, HeuristicConfig};
use crate::eval::{evaluate, paranoid_adjustment};
use crate::movegen::legal_moves;
use crate::resolve::apply_unchecked;

use super::tiebreak::{Candidate, TieBreaker};

/// Result of a MaxN search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub mv: Move,
    /// Root mover's score for the chosen line (`None` if every line was skipped).
    pub score: Option<f64>,
    pub depth: u8,
    /// Nodes materialised during the search.
    pub nodes: u64,
    /// Number of root moves sharing the best score.
    pub tied: usize,
    pub elapsed: Duration,
}

const NO_PARENT: usize = usize::MAX;

/// A materialised search node.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    state: GameState,
    /// Move that produced this node (`Pass` for the root).
    mv: Move,
    parent: usize,
    /// Arena range of the children, empty until expanded.
    children: (usize, usize),
}

/// MaxN searcher with an installed tie breaker.
pub struct MaxN {
    heuristic: HeuristicConfig,
    depth_table: Vec<DepthRule>,
    tie_breaker: Box<dyn TieBreaker>,
    arena: Vec<SearchNode>,
    nodes: u64,
}

impl MaxN {
    pub fn new(
        heuristic: HeuristicConfig,
        depth_table: Vec<DepthRule>,
        tie_breaker: Box<dyn TieBreaker>,
    ) -> Self {
        MaxN {
            heuristic,
            depth_table,
            tie_breaker,
            arena: Vec::new(),
            nodes: 0,
        }
    }

    /// Search depth for `state` from the depth table.
    pub fn depth_for(&self, state: &GameState) -> u8 {
        depth_for(&self.depth_table, state.on_board())
    }

    /// Finds the best move for the player to move in `state`.
    pub fn find(&mut self, state: &GameState, rng: &mut dyn RngCore) -> SearchResult {
        let start = Instant::now();
        let depth = self.depth_for(state);
        let root_player = state.to_move();
        self.arena.clear();
        self.nodes = 0;
        self.arena.push(SearchNode {
            state: *state,
            mv: Move::Pass,
            parent: NO_PARENT,
            children: (0, 0),
        });

        self.expand(0);
        let (first, end) = self.arena[0].children;
        let mut best_score = f64::NEG_INFINITY;
        let mut tied: Vec<usize> = Vec::new();

        for id in first..end {
            let leaf = self.search_ply(id, depth.saturating_sub(1), root_player, rng);
            self.arena.truncate(end);
            let Some(leaf) = leaf else {
                continue;
            };
            let Some(score) = self.score(state, &leaf, root_player, root_player) else {
                continue;
            };
            if score > best_score {
                best_score = score;
                tied.clear();
                tied.push(id);
            } else if score == best_score {
                tied.push(id);
            }
        }

        let (mv, score) = match tied.as_slice() {
            [] => (Move::Pass, None),
            [only] => (self.root_move(*only), Some(best_score)),
            _ => {
                let candidates: Vec<Candidate> = tied
                    .iter()
                    .map(|&id| Candidate {
                        mv: self.root_move(id),
                        state: self.arena[id].state,
                    })
                    .collect();
                let pick = self.tie_breaker.break_tie(state, &candidates, rng);
                let chosen = candidates.get(pick).unwrap_or(&candidates[0]);
                (chosen.mv, Some(best_score))
            }
        };

        let result = SearchResult {
            mv,
            score,
            depth,
            nodes: self.nodes,
            tied: tied.len(),
            elapsed: start.elapsed(),
        };
        self.arena.clear();
        debug!(
            "maxn: {} {} depth {} nodes {} tied {} score {:?} in {:?}",
            root_player, result.mv, result.depth, result.nodes, result.tied, result.score, result.elapsed
        );
        result
    }

    /// Appends the children of node `parent` to the arena and records their
    /// range on it.
    fn expand(&mut self, parent: usize) {
        let state = self.arena[parent].state;
        let first = self.arena.len();
        for mv in legal_moves(&state) {
            self.arena.push(SearchNode {
                state: apply_unchecked(&state, mv),
                mv,
                parent,
                children: (0, 0),
            });
        }
        let end = self.arena.len();
        self.arena[parent].children = (first, end);
        self.nodes += (end - first) as u64;
    }

    /// The root move on the line leading to node `id`.
    fn root_move(&self, mut id: usize) -> Move {
        while let Some(node) = self.arena.get(id) {
            match self.arena.get(node.parent) {
                Some(parent) if parent.parent == NO_PARENT => return node.mv,
                Some(_) => id = node.parent,
                None => break,
            }
        }
        Move::Pass
    }

    /// Returns the leaf state of the line chosen by the mover at node `id`,
    /// or `None` if no child line could be scored.
    fn search_ply(
        &mut self,
        id: usize,
        depth: u8,
        root_player: Player,
        rng: &mut dyn RngCore,
    ) -> Option<GameState> {
        let state = self.arena[id].state;
        if depth == 0 || state.is_game_over() {
            return Some(state);
        }
        let mover = state.to_move();
        self.expand(id);
        let (first, end) = self.arena[id].children;

        let mut best_score = f64::NEG_INFINITY;
        let mut tied: Vec<GameState> = Vec::new();
        for child in first..end {
            let leaf = self.search_ply(child, depth.saturating_sub(1), root_player, rng);
            self.arena.truncate(end);
            let Some(leaf) = leaf else {
                continue;
            };
            let Some(score) = self.score(&state, &leaf, mover, root_player) else {
                continue;
            };
            if score > best_score {
                best_score = score;
                tied.clear();
                tied.push(leaf);
            } else if score == best_score {
                tied.push(leaf);
            }
        }
        self.arena.truncate(first);
        self.arena[id].children = (first, first);

        tied.choose(rng).copied()
    }

    /// Score of `leaf` for `mover` relative to the ply state `prior`.
    fn score(
        &self,
        prior: &GameState,
        leaf: &GameState,
        mover: Player,
        root_player: Player,
    ) -> Option<f64> {
        let value = evaluate(prior, leaf, mover, &self.heuristic)?;
        let value = value
            + paranoid_adjustment(prior, leaf, mover, root_player, self.heuristic.paranoid_penalty);
        value.is_finite().then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::config::EngineConfig;
    use crate::search::UniformTieBreaker;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Records every tie it is asked to break and picks the last candidate.
    struct Recorder {
        seen: std::rc::Rc<std::cell::RefCell<Vec<usize>>>,
    }

    impl TieBreaker for Recorder {
        fn break_tie(
            &mut self,
            _root: &GameState,
            candidates: &[Candidate],
            _rng: &mut dyn RngCore,
        ) -> usize {
            self.seen.borrow_mut().push(candidates.len());
            candidates.len() - 1
        }
    }

    fn maxn_with_depth(depth: u8, tie_breaker: Box<dyn TieBreaker>) -> MaxN {
        MaxN::new(
            HeuristicConfig::default(),
            vec![DepthRule { min_on_board: 0, depth }],
            tie_breaker,
        )
    }

    #[test]
    fn default_depths_follow_table() {
        let config = EngineConfig::default();
        let m = MaxN::new(
            config.heuristic.clone(),
            config.depth_table.clone(),
            Box::new(UniformTieBreaker),
        );
        assert_eq!(m.depth_for(&GameState::initial()), 3);

        let mut s = GameState::empty(Player::Red);
        for (q, r) in [(0, 0), (1, 0), (2, 0), (0, 1), (0, 2), (1, 1)] {
            s.place_piece(Player::Red, Cell::new(q, r));
        }
        assert_eq!(m.depth_for(&s), 4);

        let mut few = GameState::empty(Player::Red);
        few.place_piece(Player::Red, Cell::new(0, 0));
        assert_eq!(m.depth_for(&few), 6);
    }

    #[test]
    fn initial_position_yields_a_move() {
        let mut m = maxn_with_depth(2, Box::new(UniformTieBreaker));
        let mut rng = StdRng::seed_from_u64(42);
        let state = GameState::initial();
        let result = m.find(&state, &mut rng);
        assert_ne!(result.mv, Move::Pass);
        assert!(legal_moves(&state).contains(&result.mv));
        assert!(result.nodes > 0);
        assert!(result.score.is_some());
    }

    #[test]
    fn takes_a_capture_when_available() {
        // Red can jump and convert a green piece; nothing else comes close.
        let mut s = GameState::empty(Player::Red);
        s.place_piece(Player::Red, Cell::new(0, 0));
        s.place_piece(Player::Red, Cell::new(-3, 3));
        s.place_piece(Player::Green, Cell::new(1, 0));
        s.place_piece(Player::Green, Cell::new(-3, 0));
        s.place_piece(Player::Blue, Cell::new(0, -3));
        let mut m = maxn_with_depth(1, Box::new(UniformTieBreaker));
        let result = m.find(&s, &mut StdRng::seed_from_u64(1));
        assert_eq!(
            result.mv,
            Move::Jump {
                from: Cell::new(0, 0),
                to: Cell::new(2, 0),
            }
        );
        assert_eq!(result.tied, 1);
    }

    #[test]
    fn tie_breaker_called_only_on_root_ties() {
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));

        // Symmetric opening at depth 1: several moves score the same.
        let mut m = maxn_with_depth(1, Box::new(Recorder { seen: seen.clone() }));
        let result = m.find(&GameState::initial(), &mut StdRng::seed_from_u64(0));
        assert!(result.tied > 1);
        assert_eq!(seen.borrow().as_slice(), &[result.tied]);

        // A unique best move never reaches the tie breaker.
        seen.borrow_mut().clear();
        let mut s = GameState::empty(Player::Red);
        s.place_piece(Player::Red, Cell::new(0, 0));
        s.place_piece(Player::Red, Cell::new(-3, 3));
        s.place_piece(Player::Green, Cell::new(1, 0));
        s.place_piece(Player::Green, Cell::new(-3, 0));
        s.place_piece(Player::Blue, Cell::new(0, -3));
        let result = m.find(&s, &mut StdRng::seed_from_u64(0));
        assert_eq!(result.tied, 1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn only_pass_available_returns_pass() {
        let mut s = GameState::empty(Player::Green);
        s.place_piece(Player::Red, Cell::new(0, 0));
        let mut m = maxn_with_depth(2, Box::new(UniformTieBreaker));
        let result = m.find(&s, &mut StdRng::seed_from_u64(0));
        assert_eq!(result.mv, Move::Pass);
    }

    #[test]
    fn non_finite_weights_fall_back_to_pass() {
        let mut heuristic = HeuristicConfig::default();
        for b in &mut heuristic.brackets {
            b.weights.capture = f64::NAN;
        }
        heuristic.trailing.capture = f64::NAN;
        heuristic.closing.capture = f64::NAN;
        let mut m = MaxN::new(
            heuristic,
            vec![DepthRule { min_on_board: 0, depth: 1 }],
            Box::new(UniformTieBreaker),
        );
        let result = m.find(&GameState::initial(), &mut StdRng::seed_from_u64(0));
        assert_eq!(result.mv, Move::Pass);
        assert_eq!(result.score, None);
    }

    #[test]
    fn arena_is_reclaimed_between_searches() {
        let mut m = maxn_with_depth(3, Box::new(UniformTieBreaker));
        let state = GameState::initial();
        m.find(&state, &mut StdRng::seed_from_u64(2));
        assert!(m.arena.is_empty());
    }

    #[test]
    fn parent_links_recover_root_move() {
        let mut m = maxn_with_depth(2, Box::new(UniformTieBreaker));
        let state = GameState::initial();
        m.arena.push(SearchNode {
            state,
            mv: Move::Pass,
            parent: NO_PARENT,
            children: (0, 0),
        });
        m.expand(0);
        let (first, end) = m.arena[0].children;
        assert_eq!(end - first, legal_moves(&state).len());
        let pick = first + 2;
        m.expand(pick);
        let (g_first, g_end) = m.arena[pick].children;
        assert!(g_end > g_first);
        for g in g_first..g_end {
            assert_eq!(m.arena[g].parent, pick);
            assert_eq!(m.root_move(g), m.arena[pick].mv);
        }
        assert_eq!(m.root_move(pick), m.arena[pick].mv);
    }

    #[test]
    fn same_seed_same_move() {
        let state = GameState::initial();
        let a = maxn_with_depth(2, Box::new(UniformTieBreaker)).find(&state, &mut StdRng::seed_from_u64(8));
        let b = maxn_with_depth(2, Box::new(UniformTieBreaker)).find(&state, &mut StdRng::seed_from_u64(8));
        assert_eq!(a.mv, b.mv);
        assert_eq!(a.nodes, b.nodes);
    }
}
