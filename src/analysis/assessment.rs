use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::azul_move::AzulMove;
use crate::engine::EngineScore;

use super::quality::QualityTier;

/// The verdict on one move. Built once by the coordinator and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveQualityAssessment {
    pub azul_move: AzulMove,
    /// Every enabled engine's outcome, keyed by engine name.
    pub engine_scores: BTreeMap<String, EngineScore>,
    /// Engines that produced a score, in configuration order.
    pub engines_used: Vec<String>,
    pub quality_score: f64,
    pub tier: QualityTier,
    /// Share of the enabled category weight that backed the score.
    pub confidence: f64,
    pub tactical_score: Option<f64>,
    pub strategic_score: Option<f64>,
    pub risk_score: Option<f64>,
    pub explanation: String,
}

impl MoveQualityAssessment {
    pub fn engine_value(&self, engine: &str) -> Option<f64> {
        self.engine_scores.get(engine).and_then(EngineScore::value)
    }

    pub fn is_default(&self) -> bool {
        self.engines_used.is_empty()
    }
}
