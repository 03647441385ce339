//! Tactical pattern detector: line completions, wall adjacency, color sets.

use crate::azul_move::Destination;
use crate::game::state::{wall_column, WALL_SIZE};

use super::evaluator::{EngineFault, EngineValue, EvaluationInput, Evaluator};
use super::heuristics::Placement;

#[derive(Clone, Copy, Debug, Default)]
pub struct PatternEngine;

impl Evaluator for PatternEngine {
    fn evaluate(&self, input: &EvaluationInput) -> Result<EngineValue, EngineFault> {
        let board = &input.before.players[input.player];
        let placement = Placement::of(&input.before, &input.azul_move);
        let color = input.azul_move.color();
        let mut value = 40.0;
        let mut adjacency = 0;

        match input.azul_move.destination() {
            Destination::PatternLine(line) => {
                let row = line as usize;
                let capacity = (row + 1) as f64;
                value += 15.0 * placement.on_line as f64 / capacity;
                if placement.completes_line {
                    let column = wall_column(row, color);
                    adjacency = board.adjacency_points(row, column);
                    value += 25.0 + (5 * adjacency).min(25) as f64;
                    // row and column progress on the wall
                    value += 2.0 * board.row_tile_count(row) as f64;
                    value += 2.0 * (0..WALL_SIZE).filter(|&r| board.wall[r][column]).count() as f64;
                }
                let color_rows = (0..WALL_SIZE).filter(|&r| board.wall_has(r, color)).count();
                value += 2.0 * color_rows as f64;
            }
            Destination::Floor => {
                value -= 10.0;
            }
        }
        value -= 8.0 * placement.overflow as f64;
        if placement.takes_token {
            value -= 3.0;
        }

        Ok(EngineValue::new(value)
            .with("completes_line", placement.completes_line as u8 as f64)
            .with("overflow", placement.overflow as f64)
            .with("adjacency", adjacency as f64))
    }
}
