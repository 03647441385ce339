//! Monte Carlo rollouts from the successor to the end of the round.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::FxHasher;

use crate::azul_move::{EnumeratorConfig, MoveEnumerator};
use crate::game::{AzulState, Rules};

use super::evaluator::{EngineFault, EngineValue, EvaluationInput, Evaluator};
use super::heuristics::relative_standing;

const MAX_ROLLOUT_PLIES: usize = 200;

pub struct SimulationEngine {
    rules: Arc<dyn Rules>,
    rollouts: u32,
    seed: u64,
}

impl SimulationEngine {
    pub fn new(rules: Arc<dyn Rules>, rollouts: u32, seed: u64) -> Self {
        Self {
            rules,
            rollouts: rollouts.max(1),
            seed,
        }
    }

    /// Seeds from the position and move so repeated analysis is reproducible.
    fn rng_for(&self, input: &EvaluationInput) -> StdRng {
        let mut hasher = FxHasher::default();
        input.before.hash(&mut hasher);
        input.azul_move.hash(&mut hasher);
        StdRng::seed_from_u64(self.seed ^ hasher.finish())
    }

    fn rollout(&self, input: &EvaluationInput, rng: &mut StdRng) -> f64 {
        let enumerator = MoveEnumerator::new(
            &*self.rules,
            EnumeratorConfig {
                filter_dominated: true,
                ..EnumeratorConfig::default()
            },
        );
        let start_round = input.after.round;
        let mut state: AzulState = input.after.clone();

        for _ in 0..MAX_ROLLOUT_PLIES {
            if state.game_over || state.round != start_round {
                break;
            }
            let candidates = enumerator.enumerate(&state);
            let next = candidates
                .choose(rng)
                .and_then(|candidate| self.rules.apply(&state, candidate).ok());
            match next {
                Some(next) => state = next,
                None => break,
            }
        }
        relative_standing(&state, input.player)
    }
}

impl Evaluator for SimulationEngine {
    fn evaluate(&self, input: &EvaluationInput) -> Result<EngineValue, EngineFault> {
        let mut rng = self.rng_for(input);
        let mut results = Vec::with_capacity(self.rollouts as usize);

        for _ in 0..self.rollouts {
            if input.out_of_time() {
                break;
            }
            results.push(self.rollout(input, &mut rng));
        }
        if results.is_empty() {
            return Err(EngineFault::OutOfTime);
        }

        let count = results.len() as f64;
        let mean = results.iter().sum::<f64>() / count;
        let variance = results.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / count;
        Ok(EngineValue::new(mean)
            .with("rollouts", count)
            .with("stddev", variance.sqrt()))
    }

    fn value_range(&self) -> (f64, f64) {
        (-30.0, 30.0)
    }
}
