//! Game state representation.
//!
//! Holds a complete snapshot of a game: which cells each player occupies,
//! how many pieces each has exited, and whose turn it is.

use super::hex::{board, iter_cells, Cell};
use super::player::{Player, ALL_PLAYERS, PIECES_PER_PLAYER, PLAYER_COUNT};

/// Complete game state at a point in time.
///
/// Piece sets are bitmasks over board cell indices. This avoids heap
/// allocation and makes the state trivially copyable, so every transition
/// produces an independent value without any aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameState {
    pieces: [u64; PLAYER_COUNT],
    exited: [u8; PLAYER_COUNT],
    to_move: Player,
}

impl GameState {
    /// The standard opening position: four pieces per player on their
    /// starting edge, no exits, Red to move.
    pub fn initial() -> Self {
        let b = board();
        GameState {
            pieces: ALL_PLAYERS.map(|p| b.start_mask(p)),
            exited: [0; PLAYER_COUNT],
            to_move: Player::Red,
        }
    }

    /// Creates an empty board with no pieces and no exits.
    pub fn empty(to_move: Player) -> Self {
        GameState {
            pieces: [0; PLAYER_COUNT],
            exited: [0; PLAYER_COUNT],
            to_move,
        }
    }

    /// Places a piece on the board. Returns false if the cell is off the
    /// board or already occupied.
    pub fn place_piece(&mut self, player: Player, cell: Cell) -> bool {
        let idx = match board().index_of(cell) {
            Some(i) => i,
            None => return false,
        };
        if self.occupied() & (1u64 << idx) != 0 {
            return false;
        }
        self.pieces[player.index()] |= 1u64 << idx;
        true
    }

    /// Sets a player's exited count.
    pub fn set_exited(&mut self, player: Player, exited: u8) {
        self.exited[player.index()] = exited;
    }

    /// Sets the player to move.
    pub fn set_to_move(&mut self, player: Player) {
        self.to_move = player;
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Bitmask of cells owned by a player.
    #[inline]
    pub fn pieces(&self, player: Player) -> u64 {
        self.pieces[player.index()]
    }

    /// Bitmask of all occupied cells.
    #[inline]
    pub fn occupied(&self) -> u64 {
        self.pieces[0] | self.pieces[1] | self.pieces[2]
    }

    /// Number of pieces a player has on the board.
    #[inline]
    pub fn count(&self, player: Player) -> u8 {
        self.pieces[player.index()].count_ones() as u8
    }

    /// Number of pieces a player has exited.
    #[inline]
    pub fn exited(&self, player: Player) -> u8 {
        self.exited[player.index()]
    }

    /// On-board plus exited pieces for a player.
    #[inline]
    pub fn total(&self, player: Player) -> u8 {
        self.count(player) + self.exited(player)
    }

    /// On-board pieces across all players.
    pub fn on_board(&self) -> u8 {
        self.occupied().count_ones() as u8
    }

    /// Returns the owner of a cell, if occupied.
    pub fn owner(&self, cell: Cell) -> Option<Player> {
        let bit = 1u64 << board().index_of(cell)?;
        ALL_PLAYERS
            .into_iter()
            .find(|p| self.pieces[p.index()] & bit != 0)
    }

    /// Returns the owner of a cell by board index, if occupied.
    #[inline]
    pub(crate) fn owner_at(&self, index: u8) -> Option<Player> {
        let bit = 1u64 << index;
        ALL_PLAYERS
            .into_iter()
            .find(|p| self.pieces[p.index()] & bit != 0)
    }

    /// Cells occupied by a player, in board index order.
    pub fn cells_of(&self, player: Player) -> impl Iterator<Item = Cell> {
        let b = board();
        iter_cells(self.pieces(player)).map(move |i| b.cell(i))
    }

    /// The player who has exited all four pieces, if any.
    pub fn winner(&self) -> Option<Player> {
        ALL_PLAYERS
            .into_iter()
            .find(|p| self.exited[p.index()] >= PIECES_PER_PLAYER)
    }

    /// Returns true once a player has won.
    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.winner().is_some()
    }

    // Raw mutators used by the transition function.

    #[inline]
    pub(crate) fn move_piece(&mut self, player: Player, from: u8, to: u8) {
        let p = player.index();
        self.pieces[p] &= !(1u64 << from);
        self.pieces[p] |= 1u64 << to;
    }

    #[inline]
    pub(crate) fn convert_piece(&mut self, from: Player, to: Player, index: u8) {
        self.pieces[from.index()] &= !(1u64 << index);
        self.pieces[to.index()] |= 1u64 << index;
    }

    #[inline]
    pub(crate) fn exit_piece(&mut self, player: Player, index: u8) {
        let p = player.index();
        self.pieces[p] &= !(1u64 << index);
        self.exited[p] += 1;
    }

    #[inline]
    pub(crate) fn advance_turn(&mut self) {
        self.to_move = self.to_move.next();
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::player::TOTAL_PIECES;

    #[test]
    fn initial_state_layout() {
        let state = GameState::initial();
        assert_eq!(state.to_move(), Player::Red);
        for p in ALL_PLAYERS {
            assert_eq!(state.count(p), 4);
            assert_eq!(state.exited(p), 0);
        }
        assert_eq!(state.owner(Cell::new(-3, 2)), Some(Player::Red));
        assert_eq!(state.owner(Cell::new(2, -3)), Some(Player::Green));
        assert_eq!(state.owner(Cell::new(1, 2)), Some(Player::Blue));
        assert_eq!(state.owner(Cell::new(0, 0)), None);
    }

    #[test]
    fn initial_state_conserves_pieces() {
        let state = GameState::initial();
        let total: u8 = ALL_PLAYERS.iter().map(|&p| state.total(p)).sum();
        assert_eq!(total, TOTAL_PIECES);
        assert_eq!(state.on_board(), 12);
    }

    #[test]
    fn empty_state_has_no_pieces() {
        let state = GameState::empty(Player::Blue);
        assert_eq!(state.occupied(), 0);
        assert_eq!(state.to_move(), Player::Blue);
        assert!(state.winner().is_none());
    }

    #[test]
    fn place_piece_rejects_duplicates_and_off_board() {
        let mut state = GameState::empty(Player::Red);
        assert!(state.place_piece(Player::Red, Cell::new(0, 0)));
        assert!(!state.place_piece(Player::Green, Cell::new(0, 0)));
        assert!(!state.place_piece(Player::Green, Cell::new(3, 3)));
        assert_eq!(state.count(Player::Red), 1);
        assert_eq!(state.count(Player::Green), 0);
    }

    #[test]
    fn winner_after_four_exits() {
        let mut state = GameState::empty(Player::Red);
        state.set_exited(Player::Green, 3);
        assert!(!state.is_game_over());
        state.set_exited(Player::Green, 4);
        assert_eq!(state.winner(), Some(Player::Green));
    }

    #[test]
    fn cells_of_lists_owned_cells() {
        let state = GameState::initial();
        let red: Vec<Cell> = state.cells_of(Player::Red).collect();
        assert_eq!(
            red,
            vec![Cell::new(-3, 0), Cell::new(-3, 1), Cell::new(-3, 2), Cell::new(-3, 3)]
        );
    }
}
