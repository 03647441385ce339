//! Static board features shared by the built-in engines.

use crate::azul_move::{AzulMove, Destination, Source};
use crate::game::state::{wall_column, PatternLine, FLOOR_CAPACITY, FLOOR_PENALTIES};
use crate::game::{AzulState, PlayerBoard, TileColor};

/// Points a board is on track for this round: banked score, wall points of
/// full pattern lines, fractional credit for partial lines, minus the floor.
pub fn projected_score(board: &PlayerBoard) -> f64 {
    let mut projected = board.score as f64;
    for (row, line) in board.pattern_lines.iter().enumerate() {
        if let Some(color) = line.color {
            let capacity = PatternLine::capacity(row);
            if line.count == capacity {
                projected += board.adjacency_points(row, wall_column(row, color)) as f64;
            } else {
                projected += line.count as f64 / capacity as f64;
            }
        }
    }
    projected - board.floor_penalty() as f64
}

/// Projected lead of `player` over the best opponent.
pub fn relative_standing(state: &AzulState, player: usize) -> f64 {
    let own = standing_of(state, player);
    let best_opponent = (0..state.player_count())
        .filter(|&other| other != player)
        .map(|other| standing_of(state, other))
        .fold(f64::NEG_INFINITY, f64::max);
    if best_opponent.is_finite() {
        own - best_opponent
    } else {
        own
    }
}

fn standing_of(state: &AzulState, player: usize) -> f64 {
    let board = &state.players[player];
    if state.game_over {
        board.score as f64
    } else {
        projected_score(board)
    }
}

/// How a move splits its drafted tiles, computed on the pre-move position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub drafted: u8,
    pub on_line: u8,
    pub overflow: u8,
    pub completes_line: bool,
    pub takes_token: bool,
}

impl Placement {
    pub fn of(state: &AzulState, azul_move: &AzulMove) -> Self {
        let board = state.current_board();
        let drafted = state.tiles_at(azul_move.source(), azul_move.color());
        let on_line = match azul_move.destination() {
            Destination::PatternLine(_) => azul_move.count().min(drafted),
            Destination::Floor => 0,
        };
        let completes_line = match azul_move.destination() {
            Destination::PatternLine(line) => {
                let row = line as usize;
                board.pattern_lines[row].count + on_line == PatternLine::capacity(row)
            }
            Destination::Floor => false,
        };
        Self {
            drafted,
            on_line,
            overflow: drafted - on_line,
            completes_line,
            takes_token: azul_move.source() == Source::Center
                && state.first_player_token_in_center,
        }
    }

    /// Extra floor penalty this placement adds to `board`.
    pub fn floor_penalty_delta(&self, board: &PlayerBoard) -> i32 {
        let before = board.floor_len().min(FLOOR_CAPACITY);
        let added = self.overflow as usize + self.takes_token as usize;
        let after = (before + added).min(FLOOR_CAPACITY);
        FLOOR_PENALTIES[before..after].iter().sum()
    }
}

/// Tiles of `color` still draftable after the move, across all sources.
pub fn remaining_on_table(state: &AzulState, color: TileColor) -> u32 {
    state
        .factories
        .iter()
        .map(|factory| factory.get(color) as u32)
        .sum::<u32>()
        + state.center.get(color) as u32
}

/// How badly `board` wants `color`: 2 for a started line of that color,
/// 1 for an empty line that could take it, 0 otherwise.
pub fn demand_for(board: &PlayerBoard, color: TileColor) -> u32 {
    let mut demand = 0;
    for (row, line) in board.pattern_lines.iter().enumerate() {
        if !board.can_place(row, color) {
            continue;
        }
        demand = demand.max(if line.color == Some(color) { 2 } else { 1 });
    }
    demand
}
