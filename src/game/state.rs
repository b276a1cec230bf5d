use serde::{Deserialize, Serialize};

use crate::game::player::Player;

/// The possible board intersection states.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum State {
    /// No stone.
    #[default]
    Empty,
    /// A stone from the first player.
    Black,
    /// A stone from the second player.
    White,
}

impl State {
    /// Returns the player whose stone occupies the intersection, or `None` when empty.
    #[must_use]
    pub fn player(self) -> Option<Player> {
        match self {
            State::Empty => None,
            State::Black => Some(Player::Black),
            State::White => Some(Player::White),
        }
    }

    /// Returns true if a stone occupies the intersection.
    #[must_use]
    pub fn is_stone(self) -> bool {
        self != State::Empty
    }
}

impl From<Player> for State {
    fn from(player: Player) -> Self {
        match player {
            Player::White => State::White,
            Player::Black => State::Black,
        }
    }
}

impl From<Option<Player>> for State {
    fn from(player: Option<Player>) -> Self {
        player.map_or(State::Empty, State::from)
    }
}
