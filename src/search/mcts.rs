//! Monte-Carlo tree search with UCT selection.
//!
//! Each dive selects down the tree while nodes are fully expanded, expands
//! one untried move, plays a uniformly random rollout and backs the reward
//! up to (but not into) the root.
//!
//! Rollouts do not play to the end of the game. A rollout stops as soon as
//! any player has exited more pieces than at the search root, or the root
//! player has no pieces left on the board. The reward is signed by who
//! advanced and shrinks with the number of plies it took.

use std::time::{Duration, Instant};

use log::debug;
use rand::Rng;

use crate::board::{GameState, Move, Player, ALL_PLAYERS, PIECES_PER_PLAYER, PLAYER_COUNT};
use crate::config::{MctsConfig, RewardConfig, SearchBudget};
use crate::movegen::{legal_moves, random_legal_move};
use crate::resolve::apply_unchecked;

use super::tiebreak::Candidate;
use super::tree::{MctsNode, MctsTree, NodeId};

/// Outcome of an MCTS run.
#[derive(Debug, Clone)]
pub struct MctsResult {
    pub mv: Move,
    /// Position of the chosen move among the root's children.
    pub index: usize,
    /// Mean reward of the chosen child.
    pub value: f64,
    pub dives: u32,
    pub nodes: usize,
    pub elapsed: Duration,
}

/// Snapshot of the search root used for the rollout stop condition.
#[derive(Debug, Clone, Copy)]
struct RootSnapshot {
    player: Player,
    exited: [u8; PLAYER_COUNT],
}

impl RootSnapshot {
    fn of(state: &GameState) -> Self {
        RootSnapshot {
            player: state.to_move(),
            exited: ALL_PLAYERS.map(|p| state.exited(p)),
        }
    }

    /// The first player whose exited count grew since the snapshot.
    fn advanced(&self, state: &GameState) -> Option<Player> {
        ALL_PLAYERS
            .into_iter()
            .find(|&p| state.exited(p) > self.exited[p.index()])
    }

    fn is_terminal(&self, state: &GameState) -> bool {
        self.advanced(state).is_some() || state.count(self.player) == 0
    }
}

/// Reward of a stopped rollout seen from `root`.
///
/// `delay` is the number of plies the rollout took, starting at 1.
pub fn rollout_reward(
    outcome: &GameState,
    root: Player,
    advanced: Option<Player>,
    delay: u32,
    reward: &RewardConfig,
) -> f64 {
    let base = reward.win_reward / delay.max(1) as f64;
    let material = |p: Player| {
        1.0 + reward.material_weight * outcome.total(p) as f64 / PIECES_PER_PLAYER as f64
    };
    match advanced {
        Some(p) if p == root => base * material(p),
        Some(p) => -base * material(p),
        None if outcome.count(root) == 0 => -base,
        None => 0.0,
    }
}

/// UCT search engine.
#[derive(Debug, Clone)]
pub struct Mcts {
    config: MctsConfig,
}

impl Mcts {
    pub fn new(config: MctsConfig) -> Self {
        Mcts { config }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Searches from `state` and returns the best move for the player to move.
    pub fn search<R: Rng + ?Sized>(&self, state: &GameState, rng: &mut R) -> MctsResult {
        let snapshot = RootSnapshot::of(state);
        let root = MctsNode::new(
            *state,
            None,
            NodeId::NONE,
            legal_moves(state),
            snapshot.is_terminal(state),
        );
        let mut tree = MctsTree::new(root);
        self.run(&mut tree, snapshot, rng)
    }

    /// Searches from `root` with the root's children fixed to `candidates`.
    /// The returned `index` refers to `candidates`.
    pub fn search_candidates<R: Rng + ?Sized>(
        &self,
        root: &GameState,
        candidates: &[Candidate],
        rng: &mut R,
    ) -> MctsResult {
        let snapshot = RootSnapshot::of(root);
        let mut tree = MctsTree::new(MctsNode::new(*root, None, NodeId::NONE, Vec::new(), false));
        for c in candidates {
            let terminal = snapshot.is_terminal(&c.state);
            let child = MctsNode::new(c.state, None, NodeId::NONE, legal_moves(&c.state), terminal);
            tree.add_child(tree.root(), c.mv, child);
        }
        self.run(&mut tree, snapshot, rng)
    }

    fn run<R: Rng + ?Sized>(
        &self,
        tree: &mut MctsTree,
        snapshot: RootSnapshot,
        rng: &mut R,
    ) -> MctsResult {
        let start = Instant::now();
        let mut dives = 0u32;

        loop {
            self.dive(tree, snapshot, rng);
            dives += 1;
            let done = match self.config.budget {
                SearchBudget::Iterations(n) => dives >= n,
                SearchBudget::TimeMs(ms) => start.elapsed() >= Duration::from_millis(ms),
            };
            if done {
                break;
            }
        }

        let root = tree.get(tree.root());
        let (mv, index, value) = match tree.best_root_child() {
            Some(pos) => {
                let (mv, id) = root.children[pos];
                (mv, pos, tree.get(id).mean_reward().unwrap_or(0.0))
            }
            None => {
                let fallback = legal_moves(&root.state).first().copied().unwrap_or(Move::Pass);
                (fallback, 0, 0.0)
            }
        };

        let result = MctsResult {
            mv,
            index,
            value,
            dives,
            nodes: tree.len(),
            elapsed: start.elapsed(),
        };
        debug!(
            "mcts: {} dives, {} nodes, best {} (mean {:.3}) in {:?}",
            result.dives, result.nodes, result.mv, result.value, result.elapsed
        );
        result
    }

    /// One selection, expansion, rollout and backpropagation pass.
    fn dive<R: Rng + ?Sized>(&self, tree: &mut MctsTree, snapshot: RootSnapshot, rng: &mut R) {
        let root_id = tree.root();
        tree.get_mut(root_id).visits += 1;

        let mut id = root_id;
        loop {
            let node = tree.get(id);
            if node.terminal {
                break;
            }
            if node.fully_expanded {
                match tree.select_child(id, self.config.exploration) {
                    Some(child) => id = child,
                    None => break,
                }
            } else {
                id = self.expand(tree, id, snapshot, rng);
                break;
            }
        }

        let state = tree.get(id).state;
        let reward = if tree.get(id).terminal {
            rollout_reward(
                &state,
                snapshot.player,
                snapshot.advanced(&state),
                1,
                &self.config.reward,
            )
        } else {
            self.rollout(state, snapshot, rng)
        };
        tree.backpropagate(id, reward);
    }

    /// Adds one randomly chosen untried move of `id` as a new child.
    fn expand<R: Rng + ?Sized>(
        &self,
        tree: &mut MctsTree,
        id: NodeId,
        snapshot: RootSnapshot,
        rng: &mut R,
    ) -> NodeId {
        let node = tree.get_mut(id);
        let pick = rng.gen_range(0..node.untried.len());
        let mv = node.untried.swap_remove(pick);
        node.fully_expanded = node.untried.is_empty();
        let state = node.state;

        let next = apply_unchecked(&state, mv);
        let terminal = snapshot.is_terminal(&next);
        let untried = if terminal { Vec::new() } else { legal_moves(&next) };
        let child = MctsNode::new(next, None, NodeId::NONE, untried, terminal);
        tree.add_child(id, mv, child)
    }

    /// Plays random moves from `state` until the stop condition or the ply cap.
    fn rollout<R: Rng + ?Sized>(&self, mut state: GameState, snapshot: RootSnapshot, rng: &mut R) -> f64 {
        let mut delay = 1u32;
        while !snapshot.is_terminal(&state) {
            if delay > self.config.max_rollout_plies {
                return 0.0;
            }
            let mv = random_legal_move(&state, rng);
            state = apply_unchecked(&state, mv);
            delay += 1;
        }
        rollout_reward(
            &state,
            snapshot.player,
            snapshot.advanced(&state),
            delay,
            &self.config.reward,
        )
    }
}
