//! Opponent denial: tiles taken that opponents wanted, minus tiles handed to them.

use crate::azul_move::Source;

use super::evaluator::{EngineFault, EngineValue, EvaluationInput, Evaluator};
use super::heuristics::demand_for;

#[derive(Clone, Copy, Debug, Default)]
pub struct DenialEngine;

impl Evaluator for DenialEngine {
    fn evaluate(&self, input: &EvaluationInput) -> Result<EngineValue, EngineFault> {
        let state = &input.before;
        let color = input.azul_move.color();
        let drafted = state.tiles_at(input.azul_move.source(), color) as f64;
        let opponents: Vec<_> = (0..state.player_count())
            .filter(|&player| player != input.player)
            .map(|player| &state.players[player])
            .collect();

        let denied: f64 = opponents
            .iter()
            .map(|board| demand_for(board, color) as f64 * drafted)
            .sum();

        // factory leftovers land in the center where the next player can take them
        let gifted: f64 = match input.azul_move.source() {
            Source::Factory(index) => {
                let factory = &state.factories[index as usize];
                factory
                    .colors()
                    .filter(|&leftover| leftover != color)
                    .map(|leftover| {
                        let pooled = (factory.get(leftover) + state.center.get(leftover)) as f64;
                        opponents
                            .iter()
                            .map(|board| demand_for(board, leftover) as f64 * pooled)
                            .fold(0.0, f64::max)
                    })
                    .sum()
            }
            Source::Center => 0.0,
        };

        let value = 50.0 + 6.0 * denied / opponents.len().max(1) as f64 - 3.0 * gifted;
        Ok(EngineValue::new(value)
            .with("denied", denied)
            .with("gifted", gifted))
    }
}
