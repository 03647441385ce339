use thiserror::Error;

use crate::azul_move::Source;

use super::tile::TileColor;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RulesError {
    #[error("Invalid player count {player_count}, must be between 2 and 4")]
    InvalidPlayerCount { player_count: usize },
    #[error("Expected {expected} factories, found {found}")]
    FactoryCountMismatch { expected: usize, found: usize },
    #[error("Factory {index} holds {tiles} tiles, at most 4 allowed")]
    OverfilledFactory { index: usize, tiles: u32 },
    #[error("Current player {current_player} is out of range")]
    CurrentPlayerOutOfRange { current_player: usize },
    #[error("Pattern line {line} of player {player} is inconsistent")]
    InconsistentPatternLine { player: usize, line: usize },
    #[error("Player {player} has an overfull floor")]
    OverfullFloor { player: usize },
    #[error("The first player token is in more than one place")]
    DuplicateFirstPlayerToken,
    #[error("The game is already over")]
    GameOver,
    #[error("Source {origin} has no {color} tiles")]
    NoTilesOfColor { origin: Source, color: TileColor },
    #[error("Cannot place {count} tiles, {available} available at the source")]
    InvalidTileCount { count: u8, available: u8 },
    #[error("Pattern line {line} does not exist")]
    NoSuchPatternLine { line: u8 },
    #[error("Pattern line {line} cannot take {color} tiles")]
    LineRejectsColor { line: u8, color: TileColor },
    #[error("Pattern line {line} only has room for {remaining} more tiles")]
    ExceedsLineCapacity { line: u8, remaining: u8 },
}
