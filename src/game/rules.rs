//! The rules collaborator: legal drafts and successor positions.
//!
//! The analysis pipeline only sees the [`Rules`] trait. [`AzulRules`] is the
//! standard game; tests substitute their own implementations to exercise
//! failure paths.

use super::error::RulesError;
use super::state::{
    factory_count, wall_column, AzulState, PatternLine, FLOOR_CAPACITY, MAX_PLAYERS, MIN_PLAYERS,
    PATTERN_LINE_COUNT, TILES_PER_FACTORY, WALL_SIZE,
};
use super::tile::TileColor;
use crate::azul_move::{AzulMove, Destination, Source, Take};

const ROW_BONUS: i32 = 2;
const COLUMN_BONUS: i32 = 7;
const COLOR_BONUS: i32 = 10;

pub trait Rules: Send + Sync {
    /// Every legal (source, color, destination) draft for `player`.
    fn legal_moves(&self, state: &AzulState, player: usize) -> Vec<Take>;

    /// Applies `azul_move` for the current player and returns the successor.
    fn apply(&self, state: &AzulState, azul_move: &AzulMove) -> Result<AzulState, RulesError>;

    /// Checks that the position is internally consistent.
    fn validate(&self, state: &AzulState) -> Result<(), RulesError>;

    fn is_terminal(&self, state: &AzulState) -> bool;

    fn is_legal(&self, state: &AzulState, azul_move: &AzulMove) -> bool {
        self.apply(state, azul_move).is_ok()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AzulRules;

impl Rules for AzulRules {
    fn legal_moves(&self, state: &AzulState, player: usize) -> Vec<Take> {
        let board = match state.players.get(player) {
            Some(board) if !state.game_over => board,
            _ => return Vec::new(),
        };

        let mut takes = Vec::new();
        for (source, tiles) in state.sources() {
            for color in tiles.colors() {
                for row in 0..PATTERN_LINE_COUNT {
                    if board.can_place(row, color) {
                        takes.push(Take {
                            source,
                            color,
                            destination: Destination::PatternLine(row as u8),
                        });
                    }
                }
                takes.push(Take {
                    source,
                    color,
                    destination: Destination::Floor,
                });
            }
        }
        takes
    }

    fn apply(&self, state: &AzulState, azul_move: &AzulMove) -> Result<AzulState, RulesError> {
        if state.game_over {
            return Err(RulesError::GameOver);
        }

        let source = azul_move.source();
        let color = azul_move.color();
        let count = azul_move.count();
        let available = state.tiles_at(source, color);
        if available == 0 {
            return Err(RulesError::NoTilesOfColor {
                origin: source,
                color,
            });
        }
        if count == 0 || count > available {
            return Err(RulesError::InvalidTileCount { count, available });
        }

        let player = state.current_player;
        let placed_on_line = match azul_move.destination() {
            Destination::PatternLine(line) => {
                let row = line as usize;
                if row >= PATTERN_LINE_COUNT {
                    return Err(RulesError::NoSuchPatternLine { line });
                }
                let board = &state.players[player];
                if !board.can_place(row, color) {
                    return Err(RulesError::LineRejectsColor { line, color });
                }
                let remaining = board.remaining_capacity(row);
                if count > remaining {
                    return Err(RulesError::ExceedsLineCapacity { line, remaining });
                }
                Some((row, count))
            }
            Destination::Floor => None,
        };

        let mut next = state.clone();
        let taken = draft(&mut next, source, color);
        let board = &mut next.players[player];
        let overflow = match placed_on_line {
            Some((row, placed)) => {
                let line = &mut board.pattern_lines[row];
                line.color = Some(color);
                line.count += placed;
                taken - placed
            }
            None => taken,
        };
        board.add_to_floor(color, overflow, &mut next.lid);

        next.current_player = (player + 1) % next.player_count();
        if next.round_over() {
            finish_round(&mut next);
        }
        Ok(next)
    }

    fn validate(&self, state: &AzulState) -> Result<(), RulesError> {
        let player_count = state.player_count();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(RulesError::InvalidPlayerCount { player_count });
        }
        let expected = factory_count(player_count);
        if state.factories.len() != expected {
            return Err(RulesError::FactoryCountMismatch {
                expected,
                found: state.factories.len(),
            });
        }
        for (index, factory) in state.factories.iter().enumerate() {
            if factory.total() > TILES_PER_FACTORY {
                return Err(RulesError::OverfilledFactory {
                    index,
                    tiles: factory.total(),
                });
            }
        }
        if state.current_player >= player_count {
            return Err(RulesError::CurrentPlayerOutOfRange {
                current_player: state.current_player,
            });
        }

        let mut token_count = state.first_player_token_in_center as usize;
        for (player, board) in state.players.iter().enumerate() {
            token_count += board.has_first_player_token as usize;
            if board.floor_len() > FLOOR_CAPACITY {
                return Err(RulesError::OverfullFloor { player });
            }
            for (row, line) in board.pattern_lines.iter().enumerate() {
                let consistent = match line.color {
                    None => line.count == 0,
                    Some(color) => {
                        line.count > 0
                            && line.count <= PatternLine::capacity(row)
                            && !board.wall_has(row, color)
                    }
                };
                if !consistent {
                    return Err(RulesError::InconsistentPatternLine { player, line: row });
                }
            }
        }
        if token_count > 1 {
            return Err(RulesError::DuplicateFirstPlayerToken);
        }
        Ok(())
    }

    fn is_terminal(&self, state: &AzulState) -> bool {
        state.game_over || state.round_over()
    }
}

/// Removes every `color` tile from `source`, pushing factory leftovers into
/// the center and handing over the first player token when drafting from
/// the center. Returns the number of tiles drafted.
fn draft(state: &mut AzulState, source: Source, color: TileColor) -> u8 {
    match source {
        Source::Factory(index) => {
            let factory = &mut state.factories[index as usize];
            let taken = factory.take_all(color);
            let leftovers = *factory;
            factory.clear();
            state.center.add_all(&leftovers);
            taken
        }
        Source::Center => {
            let taken = state.center.take_all(color);
            if state.first_player_token_in_center {
                state.first_player_token_in_center = false;
                let player = state.current_player;
                let board = &mut state.players[player];
                // the token takes a floor slot; a full floor pushes a tile into the lid
                if board.floor_len() >= FLOOR_CAPACITY {
                    if let Some(spilled) = board.floor.colors().last() {
                        board.floor.remove_one(spilled);
                        state.lid.add(spilled, 1);
                    }
                }
                state.players[player].has_first_player_token = true;
            }
            taken
        }
    }
}

/// Wall tiling, floor penalties, end-of-game detection and the next refill.
fn finish_round(state: &mut AzulState) {
    let mut next_first_player = state.current_player;

    for (player, board) in state.players.iter_mut().enumerate() {
        for row in 0..PATTERN_LINE_COUNT {
            let line = board.pattern_lines[row];
            let color = match line.color {
                Some(color) if line.count == PatternLine::capacity(row) => color,
                _ => continue,
            };
            let column = wall_column(row, color);
            board.wall[row][column] = true;
            board.score += board.adjacency_points(row, column);
            state.lid.add(color, line.count - 1);
            board.pattern_lines[row] = PatternLine::default();
        }

        board.score = (board.score - board.floor_penalty()).max(0);
        state.lid.add_all(&board.floor);
        board.floor.clear();
        if board.has_first_player_token {
            board.has_first_player_token = false;
            next_first_player = player;
        }
    }

    let wall_complete = state
        .players
        .iter()
        .any(|board| (0..WALL_SIZE).any(|row| board.row_tile_count(row) == WALL_SIZE));
    if wall_complete {
        finish_game(state);
        return;
    }

    state.round += 1;
    state.current_player = next_first_player;
    state.first_player_token_in_center = true;
    let round = state.round as usize;
    let mut draw_index = 0usize;
    state.fill_factories(|bag| {
        // deterministic rotation through the colors still in the bag
        let color = (0..TileColor::ALL.len())
            .map(|offset| TileColor::ALL[(round + draw_index + offset) % TileColor::ALL.len()])
            .find(|color| bag.get(*color) > 0);
        draw_index += 1;
        color
    });

    if state.round_over() {
        finish_game(state);
    }
}

fn finish_game(state: &mut AzulState) {
    for board in state.players.iter_mut() {
        board.score += ROW_BONUS * board.completed_rows() as i32
            + COLUMN_BONUS * board.completed_columns() as i32
            + COLOR_BONUS * board.completed_colors() as i32;
    }
    state.first_player_token_in_center = false;
    state.game_over = true;
}
