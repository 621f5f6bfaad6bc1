//! Move types.
//!
//! A turn is exactly one of: a step to an adjacent empty cell, a jump over
//! an adjacent piece onto the empty cell beyond it, an exit from a goal
//! cell, or a pass when nothing else is legal.

use std::fmt;

use super::hex::Cell;

/// A single player's action for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Move {
    /// Step: `MOVE (-3, 0) -> (-2, 0)`
    Move { from: Cell, to: Cell },

    /// Jump over the piece between `from` and `to`: `JUMP (-3, 0) -> (-1, 0)`
    Jump { from: Cell, to: Cell },

    /// Exit the board from a goal cell: `EXIT (3, -1)`
    Exit { at: Cell },

    /// No other move exists: `PASS`
    Pass,
}

impl Move {
    /// The cell the moving piece starts on, if any.
    pub fn source(&self) -> Option<Cell> {
        match *self {
            Move::Move { from, .. } | Move::Jump { from, .. } => Some(from),
            Move::Exit { at } => Some(at),
            Move::Pass => None,
        }
    }

    /// The cell jumped over by a `Jump`.
    pub fn jumped_cell(&self) -> Option<Cell> {
        match *self {
            Move::Jump { from, to } => Some(Cell::new(
                (from.q + to.q) / 2,
                (from.r + to.r) / 2,
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Move { from, to } => write!(f, "MOVE {} -> {}", from, to),
            Move::Jump { from, to } => write!(f, "JUMP {} -> {}", from, to),
            Move::Exit { at } => write!(f, "EXIT {}", at),
            Move::Pass => f.write_str("PASS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jumped_cell_is_midpoint() {
        let jump = Move::Jump {
            from: Cell::new(-3, 0),
            to: Cell::new(-1, 0),
        };
        assert_eq!(jump.jumped_cell(), Some(Cell::new(-2, 0)));

        let diagonal = Move::Jump {
            from: Cell::new(1, -1),
            to: Cell::new(-1, 1),
        };
        assert_eq!(diagonal.jumped_cell(), Some(Cell::new(0, 0)));
        assert_eq!(Move::Pass.jumped_cell(), None);
    }

    #[test]
    fn display_format() {
        let m = Move::Exit { at: Cell::new(3, -1) };
        assert_eq!(m.to_string(), "EXIT (3, -1)");
        assert_eq!(Move::Pass.to_string(), "PASS");
    }

    #[test]
    fn source_cell() {
        let m = Move::Move {
            from: Cell::new(0, 0),
            to: Cell::new(0, 1),
        };
        assert_eq!(m.source(), Some(Cell::new(0, 0)));
        assert_eq!(Move::Pass.source(), None);
    }
}
