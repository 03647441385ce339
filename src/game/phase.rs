use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::state::{AzulState, WALL_SIZE};

/// Coarse stage of the game, used to pick quality thresholds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Opening,
    Midgame,
    Endgame,
    Unknown,
}

impl GamePhase {
    /// Classifies a position by the most advanced wall on the table.
    pub fn classify(state: &AzulState) -> Self {
        let fullest_row = state
            .players
            .iter()
            .flat_map(|board| (0..WALL_SIZE).map(move |row| board.row_tile_count(row)))
            .max()
            .unwrap_or(0);
        let most_tiles = state
            .players
            .iter()
            .map(|board| board.wall_tile_count())
            .max()
            .unwrap_or(0);

        if fullest_row >= WALL_SIZE - 1 || state.round >= 5 {
            GamePhase::Endgame
        } else if state.round <= 2 && most_tiles <= 3 {
            GamePhase::Opening
        } else {
            GamePhase::Midgame
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase_str = match self {
            GamePhase::Opening => "opening",
            GamePhase::Midgame => "midgame",
            GamePhase::Endgame => "endgame",
            GamePhase::Unknown => "unknown",
        };
        write!(f, "{}", phase_str)
    }
}

/// Unrecognized names map to [`GamePhase::Unknown`] rather than failing.
impl FromStr for GamePhase {
    type Err = Infallible;
    fn from_str(phase: &str) -> Result<Self, Self::Err> {
        Ok(match phase.to_ascii_lowercase().as_str() {
            "opening" | "early" => GamePhase::Opening,
            "midgame" | "middlegame" | "mid" => GamePhase::Midgame,
            "endgame" | "late" | "end" => GamePhase::Endgame,
            _ => GamePhase::Unknown,
        })
    }
}
