use core::fmt;

use serde::{Deserialize, Serialize};

use crate::game::TileColor;

/// Where tiles are drafted from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Factory(u8),
    Center,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Factory(index) => write!(f, "F{}", index + 1),
            Source::Center => write!(f, "C"),
        }
    }
}

/// Where the drafted tiles are placed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    PatternLine(u8),
    Floor,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::PatternLine(line) => write!(f, "L{}", line + 1),
            Destination::Floor => write!(f, "floor"),
        }
    }
}

/// A raw legal draft as reported by the rules: which color from which source
/// to which destination, before the tile-count split is chosen.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Take {
    pub source: Source,
    pub color: TileColor,
    pub destination: Destination,
}

/// A fully specified candidate move.
///
/// The player drafts every tile of `color` at `source`. For a pattern-line
/// move, `count` of those tiles go to the line and the rest overflow to the
/// floor. A floor move sends all of them to the floor; `count` then only
/// records how many tiles the move was enumerated with.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AzulMove {
    ToPatternLine {
        source: Source,
        color: TileColor,
        count: u8,
        line: u8,
    },
    ToFloor {
        source: Source,
        color: TileColor,
        count: u8,
    },
}

impl AzulMove {
    pub fn new(source: Source, color: TileColor, count: u8, destination: Destination) -> Self {
        match destination {
            Destination::PatternLine(line) => AzulMove::ToPatternLine {
                source,
                color,
                count,
                line,
            },
            Destination::Floor => AzulMove::ToFloor {
                source,
                color,
                count,
            },
        }
    }

    pub fn source(&self) -> Source {
        match *self {
            AzulMove::ToPatternLine { source, .. } | AzulMove::ToFloor { source, .. } => source,
        }
    }

    pub fn color(&self) -> TileColor {
        match *self {
            AzulMove::ToPatternLine { color, .. } | AzulMove::ToFloor { color, .. } => color,
        }
    }

    pub fn count(&self) -> u8 {
        match *self {
            AzulMove::ToPatternLine { count, .. } | AzulMove::ToFloor { count, .. } => count,
        }
    }

    pub fn destination(&self) -> Destination {
        match *self {
            AzulMove::ToPatternLine { line, .. } => Destination::PatternLine(line),
            AzulMove::ToFloor { .. } => Destination::Floor,
        }
    }

    pub fn is_floor(&self) -> bool {
        matches!(self, AzulMove::ToFloor { .. })
    }
}

impl fmt::Display for AzulMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}x{} -> {}",
            self.source(),
            self.count(),
            self.color().letter(),
            self.destination()
        )
    }
}
