//! Depth-limited alpha-beta search over the successor position.
//!
//! Multi-player positions are searched "paranoid": the analysed player
//! maximizes their projected lead, every opponent minimizes it. Search runs
//! with iterative deepening and returns the deepest iteration that finished
//! before the deadline.

use std::sync::Arc;

use crate::azul_move::{EnumeratorConfig, MoveEnumerator};
use crate::game::{AzulState, Rules};

use super::evaluator::{EngineFault, EngineValue, EvaluationInput, Evaluator};
use super::heuristics::relative_standing;

pub const DEFAULT_BRANCHING: usize = 12;

pub struct SearchEngine {
    rules: Arc<dyn Rules>,
    depth: u8,
    branching: usize,
}

impl SearchEngine {
    pub fn new(rules: Arc<dyn Rules>, depth: u8) -> Self {
        Self {
            rules,
            depth,
            branching: DEFAULT_BRANCHING,
        }
    }

    pub fn with_branching(mut self, branching: usize) -> Self {
        self.branching = branching.max(1);
        self
    }

    fn child_config(&self) -> EnumeratorConfig {
        EnumeratorConfig {
            filter_dominated: true,
            prioritize: true,
            max_moves: Some(self.branching),
        }
    }

    /// Returns `None` once the deadline has passed.
    fn alpha_beta(
        &self,
        state: &AzulState,
        depth: u8,
        mut alpha: f64,
        mut beta: f64,
        input: &EvaluationInput,
        nodes: &mut u64,
    ) -> Option<f64> {
        *nodes += 1;
        if input.out_of_time() {
            return None;
        }
        if depth == 0 || self.rules.is_terminal(state) {
            return Some(relative_standing(state, input.player));
        }

        let candidates = MoveEnumerator::new(&*self.rules, self.child_config()).enumerate(state);
        let maximizing = state.current_player == input.player;
        let mut best: Option<f64> = None;

        for candidate in candidates.iter() {
            let next = match self.rules.apply(state, candidate) {
                Ok(next) => next,
                Err(_) => continue,
            };
            let score = self.alpha_beta(&next, depth - 1, alpha, beta, input, nodes)?;

            if maximizing {
                best = Some(best.map_or(score, |b| b.max(score)));
                alpha = alpha.max(score);
            } else {
                best = Some(best.map_or(score, |b| b.min(score)));
                beta = beta.min(score);
            }
            if alpha >= beta {
                break;
            }
        }

        Some(best.unwrap_or_else(|| relative_standing(state, input.player)))
    }
}

impl Evaluator for SearchEngine {
    fn evaluate(&self, input: &EvaluationInput) -> Result<EngineValue, EngineFault> {
        let mut nodes = 0;
        let mut completed = None;

        for depth in 0..=self.depth {
            match self.alpha_beta(
                &input.after,
                depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                input,
                &mut nodes,
            ) {
                Some(score) => completed = Some((depth, score)),
                None => break,
            }
        }

        let (depth, score) = completed.ok_or(EngineFault::OutOfTime)?;
        Ok(EngineValue::new(score)
            .with("depth", depth as f64)
            .with("nodes", nodes as f64))
    }

    fn value_range(&self) -> (f64, f64) {
        (-40.0, 40.0)
    }
}
