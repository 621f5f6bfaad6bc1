//! MCTS tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by `NodeId`
//! index. The tree is built fresh for every search and dropped afterwards.

use crate::board::{GameState, Move};

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for "no node" (the root's parent).
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_some(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the search tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    pub state: GameState,
    /// Move that produced this node; `None` for the root.
    pub mv: Option<Move>,
    pub parent: NodeId,
    pub visits: u32,
    /// Sum of rollout rewards backed up through this node.
    pub reward: f64,
    pub children: Vec<(Move, NodeId)>,
    /// Legal moves with no child yet.
    pub untried: Vec<Move>,
    pub fully_expanded: bool,
    pub terminal: bool,
}

impl MctsNode {
    /// Creates an unvisited node. Terminal nodes are never expanded.
    pub fn new(
        state: GameState,
        mv: Option<Move>,
        parent: NodeId,
        untried: Vec<Move>,
        terminal: bool,
    ) -> Self {
        let untried = if terminal { Vec::new() } else { untried };
        MctsNode {
            state,
            mv,
            parent,
            visits: 0,
            reward: 0.0,
            children: Vec::new(),
            fully_expanded: untried.is_empty(),
            untried,
            terminal,
        }
    }

    /// Mean reward, or `None` before the first visit.
    #[inline]
    pub fn mean_reward(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.reward / self.visits as f64)
    }
}

/// UCT value of a child.
///
/// An unvisited child scores `+inf` for any exploration constant, so
/// selection always tries it before revisiting a sibling.
pub fn uct_value(reward: f64, visits: u32, parent_visits: u32, exploration: f64) -> f64 {
    if visits == 0 {
        return f64::INFINITY;
    }
    let n = visits as f64;
    let mut value = reward / n;
    if exploration > 0.0 {
        let ln_parent = (parent_visits.max(1) as f64).ln();
        value += exploration * (ln_parent / n).sqrt();
    }
    value
}

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
    root: NodeId,
}

impl MctsTree {
    /// Creates a tree holding only the root node.
    pub fn new(root: MctsNode) -> Self {
        MctsTree {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.index()]
    }

    /// Number of nodes in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a node to the arena.
    pub fn allocate(&mut self, node: MctsNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Allocates `child` and links it under `parent`.
    pub fn add_child(&mut self, parent: NodeId, mv: Move, mut child: MctsNode) -> NodeId {
        child.parent = parent;
        child.mv = Some(mv);
        let id = self.allocate(child);
        self.get_mut(parent).children.push((mv, id));
        id
    }

    /// The child of `id` with the highest UCT value. Ties go to the first
    /// child in expansion order.
    pub fn select_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(id);
        let mut best: Option<(f64, NodeId)> = None;
        for &(_, child_id) in &node.children {
            let child = self.get(child_id);
            let value = uct_value(child.reward, child.visits, node.visits, exploration);
            if best.map_or(true, |(v, _)| value > v) {
                best = Some((value, child_id));
            }
        }
        best.map(|(_, child_id)| child_id)
    }

    /// Position (among the root's children) of the child with the best mean
    /// reward. Unvisited children are ignored.
    pub fn best_root_child(&self) -> Option<usize> {
        let root = self.get(self.root);
        let mut best: Option<(f64, usize)> = None;
        for (pos, &(_, child_id)) in root.children.iter().enumerate() {
            let Some(mean) = self.get(child_id).mean_reward() else {
                continue;
            };
            if best.map_or(true, |(v, _)| mean > v) {
                best = Some((mean, pos));
            }
        }
        best.map(|(_, pos)| pos)
    }

    /// Adds one visit and `reward` to `from` and each ancestor, stopping
    /// before the root.
    pub fn backpropagate(&mut self, from: NodeId, reward: f64) {
        let mut current = from;
        while current.is_some() && current != self.root {
            let node = self.get_mut(current);
            node.visits += 1;
            node.reward += reward;
            current = node.parent;
        }
    }
}
