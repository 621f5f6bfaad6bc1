//! Players and turn order.

use std::fmt;

use super::hex::Cell;

/// Number of players in a game.
pub const PLAYER_COUNT: usize = 3;

/// Pieces each player starts with.
pub const PIECES_PER_PLAYER: u8 = 4;

/// Total pieces in a game; conserved across every transition.
pub const TOTAL_PIECES: u8 = PIECES_PER_PLAYER * PLAYER_COUNT as u8;

/// One of the three players, in turn order.
///
/// The `#[repr(u8)]` attribute enables use as an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Player {
    Red = 0,
    Green = 1,
    Blue = 2,
}

/// All players in turn order.
pub const ALL_PLAYERS: [Player; PLAYER_COUNT] = [Player::Red, Player::Green, Player::Blue];

impl Player {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the player for an index, or `None` if out of range.
    pub const fn from_index(i: usize) -> Option<Player> {
        match i {
            0 => Some(Player::Red),
            1 => Some(Player::Green),
            2 => Some(Player::Blue),
            _ => None,
        }
    }

    /// The player who moves after this one.
    #[inline]
    pub const fn next(self) -> Player {
        match self {
            Player::Red => Player::Green,
            Player::Green => Player::Blue,
            Player::Blue => Player::Red,
        }
    }

    /// The two other players, in turn order starting after this one.
    #[inline]
    pub const fn opponents(self) -> [Player; 2] {
        [self.next(), self.next().next()]
    }

    /// The coordinate that grows towards this player's goal edge.
    ///
    /// Red advances along `q`, Green along `r`, Blue along `s`. Goal cells
    /// have axis `+3`, starting cells `-3`.
    #[inline]
    pub const fn goal_axis(self, cell: Cell) -> i8 {
        match self {
            Player::Red => cell.q,
            Player::Green => cell.r,
            Player::Blue => cell.s(),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Player::Red => "red",
            Player::Green => "green",
            Player::Blue => "blue",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_order_cycles() {
        assert_eq!(Player::Red.next(), Player::Green);
        assert_eq!(Player::Green.next(), Player::Blue);
        assert_eq!(Player::Blue.next(), Player::Red);
    }

    #[test]
    fn index_roundtrip() {
        for p in ALL_PLAYERS {
            assert_eq!(Player::from_index(p.index()), Some(p));
        }
        assert_eq!(Player::from_index(3), None);
    }

    #[test]
    fn opponents_exclude_self() {
        assert_eq!(Player::Green.opponents(), [Player::Blue, Player::Red]);
    }
}
