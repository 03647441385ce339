//! Round timing: first player token value and whether lines can still land.

use crate::azul_move::Destination;
use crate::game::state::{PatternLine, WALL_SIZE};

use super::evaluator::{EngineFault, EngineValue, EvaluationInput, Evaluator};
use super::heuristics::{remaining_on_table, Placement};

#[derive(Clone, Copy, Debug, Default)]
pub struct TimingEngine;

impl Evaluator for TimingEngine {
    fn evaluate(&self, input: &EvaluationInput) -> Result<EngineValue, EngineFault> {
        let state = &input.before;
        let board = &state.players[input.player];
        let placement = Placement::of(state, &input.azul_move);
        let table_tiles = state.tiles_on_table() as f64;
        let full_table = (state.factories.len() * 4) as f64;
        // 1.0 at the start of a round, 0.0 when the table is empty
        let round_progress = 1.0 - (table_tiles / full_table.max(1.0)).min(1.0);
        let closing_game = (0..WALL_SIZE).any(|row| board.row_tile_count(row) >= WALL_SIZE - 1);

        let mut value = 50.0;
        if placement.takes_token {
            value += 12.0 * (1.0 - round_progress) - 6.0 * round_progress;
        }
        if let Destination::PatternLine(line) = input.azul_move.destination() {
            let row = line as usize;
            if placement.completes_line {
                value += 10.0 + 10.0 * round_progress;
                if closing_game {
                    value += 10.0;
                }
            } else {
                let needed = (PatternLine::capacity(row)
                    - board.pattern_lines[row].count
                    - placement.on_line) as f64;
                let supply = remaining_on_table(&input.after, input.azul_move.color()) as f64;
                value -= 4.0 * needed * round_progress;
                if supply < needed {
                    value -= 10.0;
                }
            }
        } else {
            value -= 10.0 * (1.0 - round_progress);
        }

        Ok(EngineValue::new(value)
            .with("round_progress", round_progress)
            .with("closing_game", closing_game as u8 as f64))
    }
}
