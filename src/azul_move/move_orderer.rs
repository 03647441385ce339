//! Cheap move ordering so time-boxed analysis sees the likely-best moves first.

use crate::game::state::{wall_column, PatternLine};
use crate::game::AzulState;

use super::{AzulMove, Destination, Source};

/// Orders moves in place, placing "better" moves first.
pub trait MoveOrderer: Send + Sync {
    fn order_moves(&self, moves: &mut [AzulMove], state: &AzulState);
}

/// Leaves the enumeration order untouched.
#[derive(Clone, Default, Debug)]
pub struct NoOpMoveOrderer;

impl MoveOrderer for NoOpMoveOrderer {
    #[inline(always)]
    fn order_moves(&self, _moves: &mut [AzulMove], _state: &AzulState) {}
}

/// Prioritizes line completions, then tiles kept off the floor.
#[derive(Clone, Default, Debug)]
pub struct HeuristicMoveOrderer;

impl MoveOrderer for HeuristicMoveOrderer {
    #[inline]
    fn order_moves(&self, moves: &mut [AzulMove], state: &AzulState) {
        // stable, so ties keep enumeration order
        moves.sort_by_key(|azul_move| std::cmp::Reverse(priority(azul_move, state)));
    }
}

/// Heuristic priority of a move; higher is better.
pub fn priority(azul_move: &AzulMove, state: &AzulState) -> i32 {
    let board = state.current_board();
    let available = state.tiles_at(azul_move.source(), azul_move.color()) as i32;
    let token_cost = match azul_move.source() {
        Source::Center if state.first_player_token_in_center => 1,
        _ => 0,
    };

    match azul_move.destination() {
        Destination::PatternLine(line) => {
            let row = line as usize;
            let placed = azul_move.count() as i32;
            let overflow = available - placed;
            let fills = board.pattern_lines[row].count + azul_move.count();
            let completion = if fills == PatternLine::capacity(row) {
                let column = wall_column(row, azul_move.color());
                10 + 2 * row as i32 + board.adjacency_points(row, column)
            } else {
                0
            };
            completion + placed - 3 * overflow - token_cost
        }
        Destination::Floor => -3 * available - token_cost - 5,
    }
}
