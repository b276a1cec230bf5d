use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Black or White.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Player {
    /// Player 1.
    Black,
    /// Player 2.
    White,
}

impl Player {
    /// The opponent or enemy of the player.
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let color = match *self {
            Player::Black => "black",
            Player::White => "white",
        };
        write!(f, "{color}")
    }
}

impl FromStr for Player {
    type Err = String;

    fn from_str(color: &str) -> Result<Self, Self::Err> {
        match color.to_lowercase().as_ref() {
            "b" | "black" => Ok(Player::Black),
            "w" | "white" => Ok(Player::White),
            _ => Err(format!("invalid color: {color}")),
        }
    }
}
