//! Hex board geometry.
//!
//! The board is the set of 37 cells of a radius-3 hexagon in axial
//! coordinates. Every cell has a dense index used by the bitset state
//! representation. Neighbour, goal and distance tables are computed once
//! via `LazyLock` and shared read-only by every state and search node.

use std::fmt;
use std::sync::LazyLock;

use super::player::{Player, ALL_PLAYERS, PLAYER_COUNT};

/// Board radius: cells satisfy `|q|, |r|, |s| <= RADIUS`.
pub const RADIUS: i8 = 3;

/// Number of legal cells on the board.
pub const CELL_COUNT: usize = 37;

/// Side length of the square lookup table covering `-RADIUS..=RADIUS`.
const SPAN: usize = (2 * RADIUS as usize) + 1;

/// The six adjacency directions in axial `(dq, dr)` form.
pub const DIRECTIONS: [(i8, i8); 6] = [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, -1)];

/// A cell on the hex lattice in axial coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Cell {
    pub q: i8,
    pub r: i8,
}

impl Cell {
    pub const fn new(q: i8, r: i8) -> Self {
        Cell { q, r }
    }

    /// The implicit third cube coordinate.
    #[inline]
    pub const fn s(self) -> i8 {
        -self.q - self.r
    }

    /// The cell one step away in the given direction. May be off the board.
    #[inline]
    pub const fn offset(self, dir: (i8, i8)) -> Cell {
        Cell::new(self.q + dir.0, self.r + dir.1)
    }

    /// Hex (cube) distance between two cells.
    pub fn distance(self, other: Cell) -> u8 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        dq.max(dr).max(ds)
    }

    /// Returns true if the cell lies within the board radius.
    #[inline]
    pub fn in_bounds(self) -> bool {
        self.q.abs() <= RADIUS && self.r.abs() <= RADIUS && self.s().abs() <= RADIUS
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Precomputed board geometry.
pub struct Board {
    cells: [Cell; CELL_COUNT],
    /// Dense index for every `(q, r)` in the bounding square, `None` off-board.
    lookup: [Option<u8>; SPAN * SPAN],
    /// Neighbour index in each of the six directions.
    neighbours: [[Option<u8>; 6]; CELL_COUNT],
    /// Goal cells per player as a bitmask over cell indices.
    goal_masks: [u64; PLAYER_COUNT],
    /// Start cells per player as a bitmask over cell indices.
    start_masks: [u64; PLAYER_COUNT],
    /// Goal-distance metric per player and cell (in-goal discount applied).
    goal_distance: [[i8; CELL_COUNT]; PLAYER_COUNT],
}

/// The process-wide board, built on first use.
pub static BOARD: LazyLock<Board> = LazyLock::new(Board::build);

/// Returns the shared board.
#[inline]
pub fn board() -> &'static Board {
    &BOARD
}

impl Board {
    fn build() -> Board {
        let mut cells = [Cell::new(0, 0); CELL_COUNT];
        let mut lookup = [None; SPAN * SPAN];
        let mut n = 0usize;
        for q in -RADIUS..=RADIUS {
            for r in -RADIUS..=RADIUS {
                let cell = Cell::new(q, r);
                if !cell.in_bounds() {
                    continue;
                }
                cells[n] = cell;
                lookup[Self::slot(cell)] = Some(n as u8);
                n += 1;
            }
        }
        debug_assert_eq!(n, CELL_COUNT);

        let mut board = Board {
            cells,
            lookup,
            neighbours: [[None; 6]; CELL_COUNT],
            goal_masks: [0; PLAYER_COUNT],
            start_masks: [0; PLAYER_COUNT],
            goal_distance: [[0; CELL_COUNT]; PLAYER_COUNT],
        };

        for i in 0..CELL_COUNT {
            for (d, dir) in DIRECTIONS.iter().enumerate() {
                board.neighbours[i][d] = board.index_of(cells[i].offset(*dir));
            }
        }

        for player in ALL_PLAYERS {
            let p = player.index();
            for (i, &cell) in cells.iter().enumerate() {
                let axis = player.goal_axis(cell);
                if axis == RADIUS {
                    board.goal_masks[p] |= 1u64 << i;
                }
                if axis == -RADIUS {
                    board.start_masks[p] |= 1u64 << i;
                }
                let mut dist = RADIUS - axis;
                if axis == RADIUS {
                    dist -= 1;
                }
                board.goal_distance[p][i] = dist;
            }
        }

        board
    }

    #[inline]
    fn slot(cell: Cell) -> usize {
        (cell.q + RADIUS) as usize * SPAN + (cell.r + RADIUS) as usize
    }

    /// Returns the dense index of a cell, or `None` if it is not on the board.
    #[inline]
    pub fn index_of(&self, cell: Cell) -> Option<u8> {
        if !cell.in_bounds() {
            return None;
        }
        self.lookup[Self::slot(cell)]
    }

    /// Returns true if the cell is a legal board cell.
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.index_of(cell).is_some()
    }

    /// Returns the cell at a dense index.
    #[inline]
    pub fn cell(&self, index: u8) -> Cell {
        self.cells[index as usize]
    }

    /// All legal cells in index order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Neighbour of a cell index in direction `dir` (0..6).
    #[inline]
    pub fn neighbour(&self, index: u8, dir: usize) -> Option<u8> {
        self.neighbours[index as usize][dir]
    }

    /// Bitmask of a player's goal cells.
    #[inline]
    pub fn goal_mask(&self, player: Player) -> u64 {
        self.goal_masks[player.index()]
    }

    /// Bitmask of a player's starting cells.
    #[inline]
    pub fn start_mask(&self, player: Player) -> u64 {
        self.start_masks[player.index()]
    }

    /// Returns true if the cell is one of the player's goal cells.
    pub fn is_goal(&self, player: Player, cell: Cell) -> bool {
        self.index_of(cell)
            .is_some_and(|i| self.goal_mask(player) & (1u64 << i) != 0)
    }

    /// Goal-distance metric for a piece of `player` at cell `index`.
    #[inline]
    pub fn goal_distance(&self, player: Player, index: u8) -> i8 {
        self.goal_distance[player.index()][index as usize]
    }
}

/// Iterates the set bit indices of a cell bitmask in ascending order.
#[inline]
pub fn iter_cells(mut mask: u64) -> impl Iterator<Item = u8> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let i = mask.trailing_zeros() as u8;
        mask &= mask - 1;
        Some(i)
    })
}
