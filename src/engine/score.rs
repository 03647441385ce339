use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The weighted signal an engine contributes to the composite score.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineCategory {
    Pattern,
    Strategic,
    Risk,
    BoardImpact,
    OpponentDenial,
    Timing,
}

impl EngineCategory {
    pub const ALL: [EngineCategory; 6] = [
        EngineCategory::Pattern,
        EngineCategory::Strategic,
        EngineCategory::Risk,
        EngineCategory::BoardImpact,
        EngineCategory::OpponentDenial,
        EngineCategory::Timing,
    ];
}

impl fmt::Display for EngineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category_str = match self {
            EngineCategory::Pattern => "pattern",
            EngineCategory::Strategic => "strategic",
            EngineCategory::Risk => "risk",
            EngineCategory::BoardImpact => "board_impact",
            EngineCategory::OpponentDenial => "opponent_denial",
            EngineCategory::Timing => "timing",
        };
        write!(f, "{}", category_str)
    }
}

type ParseError = &'static str;
impl FromStr for EngineCategory {
    type Err = ParseError;
    fn from_str(category: &str) -> Result<Self, Self::Err> {
        EngineCategory::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.to_string() == category)
            .ok_or("invalid category; options are: pattern, strategic, risk, board_impact, opponent_denial, timing")
    }
}

/// Why an engine produced no score for a move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    EngineError(String),
    InvalidMoveSimulation(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::EngineError(msg) => write!(f, "engine error: {}", msg),
            FailureKind::InvalidMoveSimulation(msg) => write!(f, "invalid move simulation: {}", msg),
        }
    }
}

/// Outcome of one engine evaluating one move. `value` is normalized to 0..=100.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EngineScore {
    Success {
        value: f64,
        raw: f64,
        metadata: BTreeMap<String, f64>,
    },
    Failure {
        reason: FailureKind,
    },
}

impl EngineScore {
    pub fn failure(reason: FailureKind) -> Self {
        EngineScore::Failure { reason }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            EngineScore::Success { value, .. } => Some(*value),
            EngineScore::Failure { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EngineScore::Success { .. })
    }
}

/// Success/failure counters for one engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineTally {
    pub succeeded: u64,
    pub timeouts: u64,
    pub errors: u64,
    pub invalid_simulations: u64,
}

impl EngineTally {
    pub fn record(&mut self, score: &EngineScore) {
        match score {
            EngineScore::Success { .. } => self.succeeded += 1,
            EngineScore::Failure { reason } => match reason {
                FailureKind::Timeout => self.timeouts += 1,
                FailureKind::EngineError(_) => self.errors += 1,
                FailureKind::InvalidMoveSimulation(_) => self.invalid_simulations += 1,
            },
        }
    }

    pub fn merge(&mut self, other: &EngineTally) {
        self.succeeded += other.succeeded;
        self.timeouts += other.timeouts;
        self.errors += other.errors;
        self.invalid_simulations += other.invalid_simulations;
    }

    pub fn failures(&self) -> u64 {
        self.timeouts + self.errors + self.invalid_simulations
    }

    pub fn total(&self) -> u64 {
        self.succeeded + self.failures()
    }
}
