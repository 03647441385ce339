//! The capability every wrapped evaluation engine implements.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::azul_move::AzulMove;
use crate::game::AzulState;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineFault {
    #[error("{0}")]
    Message(String),
    #[error("Evaluation produced a non-finite value")]
    NonFinite,
    #[error("Ran out of time before producing a value")]
    OutOfTime,
}

/// Everything an engine may look at: the position before the move, the
/// successor produced by the rules, and the deadline to respect.
#[derive(Clone, Debug)]
pub struct EvaluationInput {
    pub before: AzulState,
    pub after: AzulState,
    pub azul_move: AzulMove,
    pub player: usize,
    pub deadline: Instant,
}

impl EvaluationInput {
    pub fn time_remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn out_of_time(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Raw engine output before normalization.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct EngineValue {
    pub value: f64,
    pub metadata: BTreeMap<String, f64>,
}

impl EngineValue {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

pub trait Evaluator: Send + Sync {
    fn evaluate(&self, input: &EvaluationInput) -> Result<EngineValue, EngineFault>;

    /// Range of raw values that maps onto 0..=100; values outside are clamped.
    fn value_range(&self) -> (f64, f64) {
        (0.0, 100.0)
    }
}

impl<F> Evaluator for F
where
    F: Fn(&EvaluationInput) -> Result<EngineValue, EngineFault> + Send + Sync,
{
    fn evaluate(&self, input: &EvaluationInput) -> Result<EngineValue, EngineFault> {
        self(input)
    }
}
