//! Heuristic position evaluation.
//!
//! Scores how much an outcome state improved on a prior state for one
//! player. Four signals are measured, each as a change from `prior` to
//! `outcome`:
//!
//! - distance: mean goal distance of the player's on-board pieces
//! - capture: total pieces (on board plus exited)
//! - exit: exited pieces
//! - attack: mean distance to the strongest opponent's pieces
//!
//! and combined linearly with weights chosen by [`select_weights`].
//!
//! Design: signals are computed straight from the state bitsets and the
//! precomputed board tables -- no heap allocation.

use crate::board::{board, iter_cells, GameState, Player};
use crate::config::{HeuristicConfig, SignalWeights};

use super::weights::select_weights;

/// Raw signal deltas for one player between two states.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Signals {
    pub distance: f64,
    pub capture: f64,
    pub exit: f64,
    pub attack: f64,
}

impl Signals {
    /// Measures the change for `player` from `prior` to `outcome`.
    pub fn measure(prior: &GameState, outcome: &GameState, player: Player) -> Self {
        let target = strongest_opponent(outcome, player);
        Signals {
            distance: goal_distance(prior, player) - goal_distance(outcome, player),
            capture: outcome.total(player) as f64 - prior.total(player) as f64,
            exit: outcome.exited(player) as f64 - prior.exited(player) as f64,
            attack: attack_distance(prior, player, target)
                - attack_distance(outcome, player, target),
        }
    }

    /// Weighted sum of the signals.
    pub fn score(&self, w: &SignalWeights) -> f64 {
        w.distance * self.distance
            + w.capture * self.capture
            + w.exit * self.exit
            + w.attack * self.attack
    }
}

/// Mean goal distance of a player's on-board pieces. Pieces already in the
/// goal count one less. Zero when the player has no pieces on the board.
pub fn goal_distance(state: &GameState, player: Player) -> f64 {
    let pieces = state.pieces(player);
    let n = pieces.count_ones();
    if n == 0 {
        return 0.0;
    }
    let b = board();
    let sum: i32 = iter_cells(pieces)
        .map(|i| b.goal_distance(player, i) as i32)
        .sum();
    sum as f64 / n as f64
}

/// The opponent closest to winning: highest `count + 3 * exited`.
/// Ties go to the higher player index (Blue over Green over Red).
pub fn strongest_opponent(state: &GameState, player: Player) -> Player {
    let [a, b] = player.opponents();
    let key = |p: Player| (state.count(p) as u32 + 3 * state.exited(p) as u32, p.index());
    if key(a) > key(b) {
        a
    } else {
        b
    }
}

/// Mean pairwise hex distance between the pieces of `player` and `target`.
/// Zero when either side has no pieces on the board.
pub fn attack_distance(state: &GameState, player: Player, target: Player) -> f64 {
    let mine = state.pieces(player);
    let theirs = state.pieces(target);
    let pairs = mine.count_ones() * theirs.count_ones();
    if pairs == 0 {
        return 0.0;
    }
    let b = board();
    let mut sum = 0u32;
    for m in iter_cells(mine) {
        let mc = b.cell(m);
        for t in iter_cells(theirs) {
            sum += mc.distance(b.cell(t)) as u32;
        }
    }
    sum as f64 / pairs as f64
}

/// Evaluates `outcome` against `prior` from `player`'s perspective.
///
/// Returns `None` if the result is not a finite number.
pub fn evaluate(
    prior: &GameState,
    outcome: &GameState,
    player: Player,
    config: &HeuristicConfig,
) -> Option<f64> {
    let (weights, _) = select_weights(config, prior, player);
    let value = Signals::measure(prior, outcome, player).score(&weights);
    value.is_finite().then_some(value)
}

/// Paranoid term for a ply moved by `mover` while searching for `root`.
///
/// When a non-root player's line of play costs the root player pieces, the
/// line is scored higher for that player, so the search assumes opponents
/// play against the root player.
pub fn paranoid_adjustment(
    prior: &GameState,
    outcome: &GameState,
    mover: Player,
    root: Player,
    penalty: f64,
) -> f64 {
    if mover != root && outcome.total(root) < prior.total(root) {
        penalty
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, Move};
    use crate::resolve::apply_move;

    #[test]
    fn goal_distance_of_initial_position() {
        let s = GameState::initial();
        // Every start cell is six steps from the goal line.
        assert_eq!(goal_distance(&s, Player::Red), 6.0);
        assert_eq!(goal_distance(&s, Player::Green), 6.0);
        assert_eq!(goal_distance(&s, Player::Blue), 6.0);
    }

    #[test]
    fn goal_distance_discounts_goal_and_handles_empty() {
        let mut s = GameState::empty(Player::Red);
        assert_eq!(goal_distance(&s, Player::Red), 0.0);
        s.place_piece(Player::Red, Cell::new(3, -1));
        s.place_piece(Player::Red, Cell::new(1, 0));
        // (-1 + 2) / 2
        assert_eq!(goal_distance(&s, Player::Red), 0.5);
    }

    #[test]
    fn forward_step_improves_distance() {
        let prior = GameState::initial();
        let mv = Move::Move {
            from: Cell::new(-3, 0),
            to: Cell::new(-2, 0),
        };
        let outcome = apply_move(&prior, mv).unwrap();
        let sig = Signals::measure(&prior, &outcome, Player::Red);
        assert_eq!(sig.distance, 0.25);
        assert_eq!(sig.capture, 0.0);
        assert_eq!(sig.exit, 0.0);

        let config = HeuristicConfig::default();
        assert_eq!(evaluate(&prior, &outcome, Player::Red, &config), Some(0.25));
    }

    #[test]
    fn capture_is_rewarded_for_capturer_and_penalised_for_victim() {
        let mut prior = GameState::empty(Player::Red);
        prior.place_piece(Player::Red, Cell::new(0, 0));
        prior.place_piece(Player::Red, Cell::new(-3, 0));
        prior.place_piece(Player::Green, Cell::new(1, 0));
        prior.place_piece(Player::Green, Cell::new(0, -3));
        prior.place_piece(Player::Blue, Cell::new(0, 3));
        prior.place_piece(Player::Blue, Cell::new(3, 0));
        let outcome = apply_move(
            &prior,
            Move::Jump {
                from: Cell::new(0, 0),
                to: Cell::new(2, 0),
            },
        )
        .unwrap();

        let red = Signals::measure(&prior, &outcome, Player::Red);
        assert_eq!(red.capture, 1.0);
        let green = Signals::measure(&prior, &outcome, Player::Green);
        assert_eq!(green.capture, -1.0);

        let config = HeuristicConfig::default();
        let r = evaluate(&prior, &outcome, Player::Red, &config).unwrap();
        let g = evaluate(&prior, &outcome, Player::Green, &config).unwrap();
        assert!(r > 0.0);
        assert!(g < 0.0);
    }

    #[test]
    fn exit_signal_counts_exits() {
        let mut prior = GameState::empty(Player::Red);
        prior.place_piece(Player::Red, Cell::new(3, 0));
        prior.place_piece(Player::Red, Cell::new(0, 0));
        prior.place_piece(Player::Green, Cell::new(0, 1));
        prior.place_piece(Player::Blue, Cell::new(-1, 0));
        let outcome = apply_move(&prior, Move::Exit { at: Cell::new(3, 0) }).unwrap();
        let sig = Signals::measure(&prior, &outcome, Player::Red);
        assert_eq!(sig.exit, 1.0);
        assert_eq!(sig.capture, 0.0);
    }

    #[test]
    fn strongest_opponent_weights_exits() {
        let mut s = GameState::initial();
        s.set_exited(Player::Blue, 1);
        assert_eq!(strongest_opponent(&s, Player::Red), Player::Blue);
        s.set_exited(Player::Blue, 0);
        s.set_exited(Player::Green, 1);
        assert_eq!(strongest_opponent(&s, Player::Red), Player::Green);
    }

    #[test]
    fn strongest_opponent_ties_go_to_higher_index() {
        let s = GameState::initial();
        assert_eq!(strongest_opponent(&s, Player::Red), Player::Blue);
        assert_eq!(strongest_opponent(&s, Player::Green), Player::Blue);
        assert_eq!(strongest_opponent(&s, Player::Blue), Player::Green);
    }

    #[test]
    fn attack_distance_is_mean_pairwise() {
        let mut s = GameState::empty(Player::Red);
        s.place_piece(Player::Red, Cell::new(0, 0));
        s.place_piece(Player::Green, Cell::new(1, 0));
        s.place_piece(Player::Green, Cell::new(3, 0));
        assert_eq!(attack_distance(&s, Player::Red, Player::Green), 2.0);
        assert_eq!(attack_distance(&s, Player::Red, Player::Blue), 0.0);
    }

    #[test]
    fn paranoid_bonus_only_for_non_root_gains() {
        let mut prior = GameState::empty(Player::Green);
        prior.place_piece(Player::Green, Cell::new(0, 0));
        prior.place_piece(Player::Red, Cell::new(1, 0));
        let outcome = apply_move(
            &prior,
            Move::Jump {
                from: Cell::new(0, 0),
                to: Cell::new(2, 0),
            },
        )
        .unwrap();
        assert_eq!(
            paranoid_adjustment(&prior, &outcome, Player::Green, Player::Red, 3.0),
            3.0
        );
        assert_eq!(
            paranoid_adjustment(&prior, &outcome, Player::Red, Player::Red, 3.0),
            0.0
        );
        assert_eq!(
            paranoid_adjustment(&prior, &prior, Player::Green, Player::Red, 3.0),
            0.0
        );
    }

    #[test]
    fn non_finite_weights_give_none() {
        let prior = GameState::initial();
        let outcome = apply_move(
            &prior,
            Move::Move {
                from: Cell::new(-3, 0),
                to: Cell::new(-2, 0),
            },
        )
        .unwrap();
        let mut config = HeuristicConfig::default();
        for b in &mut config.brackets {
            b.weights.distance = f64::NAN;
        }
        assert_eq!(evaluate(&prior, &outcome, Player::Red, &config), None);
    }
}
