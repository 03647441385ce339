//! Exposure to floor penalties and lines that may never complete.

use crate::azul_move::Destination;
use crate::game::state::PatternLine;

use super::evaluator::{EngineFault, EngineValue, EvaluationInput, Evaluator};
use super::heuristics::{remaining_on_table, Placement};

#[derive(Clone, Copy, Debug, Default)]
pub struct RiskEngine;

impl Evaluator for RiskEngine {
    fn evaluate(&self, input: &EvaluationInput) -> Result<EngineValue, EngineFault> {
        let board = &input.before.players[input.player];
        let placement = Placement::of(&input.before, &input.azul_move);
        let floor_delta = placement.floor_penalty_delta(board);

        // tiles still needed on the target line versus what is left to draft
        let mut stranded = 0.0;
        if let Destination::PatternLine(line) = input.azul_move.destination() {
            let row = line as usize;
            if !placement.completes_line {
                let needed = (PatternLine::capacity(row)
                    - board.pattern_lines[row].count
                    - placement.on_line) as u32;
                let supply = remaining_on_table(&input.after, input.azul_move.color());
                if supply < needed {
                    stranded = (needed - supply) as f64;
                }
            }
        }

        let open_lines = input.after.players[input.player]
            .pattern_lines
            .iter()
            .enumerate()
            .filter(|(row, line)| !line.is_empty() && line.count < PatternLine::capacity(*row))
            .count();

        let value = 100.0 - 12.0 * floor_delta as f64 - 8.0 * stranded - 3.0 * open_lines as f64;
        Ok(EngineValue::new(value)
            .with("floor_penalty", floor_delta as f64)
            .with("stranded_tiles", stranded)
            .with("open_lines", open_lines as f64))
    }
}
