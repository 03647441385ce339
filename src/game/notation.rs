//! Canonical text notation for positions.
//!
//! Six whitespace-separated fields, in the spirit of FEN:
//!
//! ```text
//! 2:0:1:live bbyr,kkww,rryy,-,bwyk * 16.15.16.17.16 0.0.0.0.0 0/-,-,-,-,-/ooooo.ooooo.ooooo.ooooo.ooooo/-|...
//! ```
//!
//! 1. `players:current:round:live|over`
//! 2. factories, comma separated (`-` for an empty factory)
//! 3. center tiles, prefixed with `*` while it holds the first player token
//! 4. bag counts per color (`b.y.r.k.w`)
//! 5. lid counts per color
//! 6. `|`-separated player boards: `score/lines/wall/floor`
//!
//! Tiles are always written in color order so equal positions encode equally.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::state::{AzulState, PatternLine, PlayerBoard, PATTERN_LINE_COUNT, WALL_SIZE};
use super::tile::{TileColor, TileCounts};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotationError {
    #[error("Wrong number of fields: 6 expected, {field_count} given")]
    WrongNumberOfFields { field_count: usize },
    #[error("Invalid header: {header:?}")]
    InvalidHeader { header: String },
    #[error("Invalid tile character: {invalid_character:?}")]
    InvalidTileCharacter { invalid_character: char },
    #[error("Invalid tile counts: {value:?}")]
    InvalidCounts { value: String },
    #[error("Invalid player board: {board:?}")]
    InvalidPlayerBoard { board: String },
    #[error("Invalid pattern line: {line:?}")]
    InvalidPatternLine { line: String },
    #[error("Invalid wall: {wall:?}")]
    InvalidWall { wall: String },
    #[error("Player count mismatch: header says {declared}, {found} boards given")]
    PlayerCountMismatch { declared: usize, found: usize },
}

type NotationResult<T> = Result<T, NotationError>;

const TOKEN_MARKER: char = '*';
const EMPTY_MARKER: &str = "-";

impl fmt::Display for AzulState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.game_over { "over" } else { "live" };
        write!(
            f,
            "{}:{}:{}:{} ",
            self.player_count(),
            self.current_player,
            self.round,
            status
        )?;

        let factories: Vec<String> = self.factories.iter().map(tiles_or_empty).collect();
        write!(f, "{} ", factories.join(","))?;
        write!(
            f,
            "{} ",
            marked_tiles(self.first_player_token_in_center, &self.center)
        )?;
        write!(f, "{} {} ", counts(&self.bag), counts(&self.lid))?;

        let boards: Vec<String> = self.players.iter().map(board_notation).collect();
        write!(f, "{}", boards.join("|"))
    }
}

impl FromStr for AzulState {
    type Err = NotationError;

    fn from_str(notation: &str) -> NotationResult<Self> {
        let fields: Vec<&str> = notation.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(NotationError::WrongNumberOfFields {
                field_count: fields.len(),
            });
        }

        let (player_count, current_player, round, game_over) = parse_header(fields[0])?;
        let factories = fields[1]
            .split(',')
            .map(parse_tiles_or_empty)
            .collect::<NotationResult<Vec<_>>>()?;
        let (first_player_token_in_center, center) = parse_marked_tiles(fields[2])?;
        let bag = parse_counts(fields[3])?;
        let lid = parse_counts(fields[4])?;
        let players = fields[5]
            .split('|')
            .map(parse_board)
            .collect::<NotationResult<Vec<_>>>()?;

        if players.len() != player_count {
            return Err(NotationError::PlayerCountMismatch {
                declared: player_count,
                found: players.len(),
            });
        }

        Ok(AzulState {
            factories,
            center,
            first_player_token_in_center,
            players,
            current_player,
            round,
            bag,
            lid,
            game_over,
        })
    }
}

fn tiles_or_empty(tiles: &TileCounts) -> String {
    if tiles.is_empty() {
        EMPTY_MARKER.to_string()
    } else {
        tiles.to_string()
    }
}

fn marked_tiles(has_token: bool, tiles: &TileCounts) -> String {
    match (has_token, tiles.is_empty()) {
        (false, true) => EMPTY_MARKER.to_string(),
        (true, _) => format!("{}{}", TOKEN_MARKER, tiles),
        (false, false) => tiles.to_string(),
    }
}

fn counts(tiles: &TileCounts) -> String {
    let parts: Vec<String> = tiles.as_array().iter().map(|c| c.to_string()).collect();
    parts.join(".")
}

fn board_notation(board: &PlayerBoard) -> String {
    let lines: Vec<String> = board
        .pattern_lines
        .iter()
        .map(|line| match line.color {
            Some(color) => format!("{}{}", line.count, color.letter()),
            None => EMPTY_MARKER.to_string(),
        })
        .collect();
    let wall: Vec<String> = board
        .wall
        .iter()
        .map(|row| {
            row.iter()
                .map(|&filled| if filled { 'x' } else { 'o' })
                .collect()
        })
        .collect();
    format!(
        "{}/{}/{}/{}",
        board.score,
        lines.join(","),
        wall.join("."),
        marked_tiles(board.has_first_player_token, &board.floor)
    )
}

fn parse_header(header: &str) -> NotationResult<(usize, usize, u32, bool)> {
    let invalid = || NotationError::InvalidHeader {
        header: header.to_string(),
    };
    let parts: Vec<&str> = header.split(':').collect();
    if parts.len() != 4 {
        return Err(invalid());
    }
    let player_count = parts[0].parse().map_err(|_| invalid())?;
    let current_player = parts[1].parse().map_err(|_| invalid())?;
    let round = parts[2].parse().map_err(|_| invalid())?;
    let game_over = match parts[3] {
        "live" => false,
        "over" => true,
        _ => return Err(invalid()),
    };
    Ok((player_count, current_player, round, game_over))
}

fn parse_tiles(tiles: &str) -> NotationResult<TileCounts> {
    let mut counts = TileCounts::default();
    for tile_char in tiles.chars() {
        let color = TileColor::from_letter(tile_char).ok_or(NotationError::InvalidTileCharacter {
            invalid_character: tile_char,
        })?;
        counts.add(color, 1);
    }
    Ok(counts)
}

fn parse_tiles_or_empty(tiles: &str) -> NotationResult<TileCounts> {
    if tiles == EMPTY_MARKER {
        Ok(TileCounts::default())
    } else {
        parse_tiles(tiles)
    }
}

fn parse_marked_tiles(tiles: &str) -> NotationResult<(bool, TileCounts)> {
    if tiles == EMPTY_MARKER {
        return Ok((false, TileCounts::default()));
    }
    match tiles.strip_prefix(TOKEN_MARKER) {
        Some(rest) => Ok((true, parse_tiles(rest)?)),
        None => Ok((false, parse_tiles(tiles)?)),
    }
}

fn parse_counts(value: &str) -> NotationResult<TileCounts> {
    let invalid = || NotationError::InvalidCounts {
        value: value.to_string(),
    };
    let parts = value
        .split('.')
        .map(|part| part.parse::<u8>().map_err(|_| invalid()))
        .collect::<NotationResult<Vec<u8>>>()?;
    if parts.len() != TileColor::ALL.len() {
        return Err(invalid());
    }
    let mut counts = [0u8; 5];
    counts.copy_from_slice(&parts);
    Ok(TileCounts::new(counts))
}

fn parse_board(board: &str) -> NotationResult<PlayerBoard> {
    let parts: Vec<&str> = board.split('/').collect();
    if parts.len() != 4 {
        return Err(NotationError::InvalidPlayerBoard {
            board: board.to_string(),
        });
    }
    let score = parts[0]
        .parse()
        .map_err(|_| NotationError::InvalidPlayerBoard {
            board: board.to_string(),
        })?;

    let lines: Vec<&str> = parts[1].split(',').collect();
    if lines.len() != PATTERN_LINE_COUNT {
        return Err(NotationError::InvalidPatternLine {
            line: parts[1].to_string(),
        });
    }
    let mut pattern_lines = [PatternLine::default(); PATTERN_LINE_COUNT];
    for (slot, line) in pattern_lines.iter_mut().zip(lines.iter()) {
        *slot = parse_pattern_line(line)?;
    }

    let rows: Vec<&str> = parts[2].split('.').collect();
    let invalid_wall = || NotationError::InvalidWall {
        wall: parts[2].to_string(),
    };
    if rows.len() != WALL_SIZE {
        return Err(invalid_wall());
    }
    let mut wall = [[false; WALL_SIZE]; WALL_SIZE];
    for (row, row_str) in rows.iter().enumerate() {
        if row_str.chars().count() != WALL_SIZE {
            return Err(invalid_wall());
        }
        for (column, cell) in row_str.chars().enumerate() {
            wall[row][column] = match cell {
                'x' => true,
                'o' => false,
                _ => return Err(invalid_wall()),
            };
        }
    }

    let (has_first_player_token, floor) = parse_marked_tiles(parts[3])?;
    Ok(PlayerBoard {
        score,
        pattern_lines,
        wall,
        floor,
        has_first_player_token,
    })
}

fn parse_pattern_line(line: &str) -> NotationResult<PatternLine> {
    if line == EMPTY_MARKER {
        return Ok(PatternLine::default());
    }
    let invalid = || NotationError::InvalidPatternLine {
        line: line.to_string(),
    };
    let letter = line.chars().last().ok_or_else(invalid)?;
    let color = TileColor::from_letter(letter).ok_or_else(invalid)?;
    let count: u8 = line[..line.len() - letter.len_utf8()]
        .parse()
        .map_err(|_| invalid())?;
    Ok(PatternLine {
        color: Some(color),
        count,
    })
}
