//! Quality tiers, the phase-aware threshold ladder and the category weights
//! that fold engine scores into a composite.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::EngineCategory;
use crate::game::GamePhase;

use super::error::ConfigError;

/// Ordinal verdict on a move; variants are declared worst to best.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Poor,
    Dubious,
    Good,
    Excellent,
    Brilliant,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Poor,
        QualityTier::Dubious,
        QualityTier::Good,
        QualityTier::Excellent,
        QualityTier::Brilliant,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QualityTier::Poor => "poor",
            QualityTier::Dubious => "dubious",
            QualityTier::Good => "good",
            QualityTier::Excellent => "excellent",
            QualityTier::Brilliant => "brilliant",
        }
    }

    /// A map holding every tier with a zero count.
    pub fn empty_distribution() -> BTreeMap<QualityTier, usize> {
        QualityTier::ALL.iter().map(|&tier| (tier, 0)).collect()
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

type ParseError = &'static str;
impl FromStr for QualityTier {
    type Err = ParseError;
    fn from_str(tier: &str) -> Result<Self, Self::Err> {
        QualityTier::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.name() == tier)
            .ok_or("invalid tier; options are: poor, dubious, good, excellent, brilliant")
    }
}

/// Lower bounds of each tier above `Poor`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub brilliant: f64,
    pub excellent: f64,
    pub good: f64,
    pub dubious: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            brilliant: 90.0,
            excellent: 75.0,
            good: 50.0,
            dubious: 25.0,
        }
    }
}

impl TierThresholds {
    pub fn tier_for(&self, score: f64) -> QualityTier {
        if score >= self.brilliant {
            QualityTier::Brilliant
        } else if score >= self.excellent {
            QualityTier::Excellent
        } else if score >= self.good {
            QualityTier::Good
        } else if score >= self.dubious {
            QualityTier::Dubious
        } else {
            QualityTier::Poor
        }
    }

    pub fn lower_bound(&self, tier: QualityTier) -> f64 {
        match tier {
            QualityTier::Poor => 0.0,
            QualityTier::Dubious => self.dubious,
            QualityTier::Good => self.good,
            QualityTier::Excellent => self.excellent,
            QualityTier::Brilliant => self.brilliant,
        }
    }

    /// Lower bound of the next tier up; `None` for `Brilliant`.
    pub fn upper_bound(&self, tier: QualityTier) -> Option<f64> {
        match tier {
            QualityTier::Poor => Some(self.dubious),
            QualityTier::Dubious => Some(self.good),
            QualityTier::Good => Some(self.excellent),
            QualityTier::Excellent => Some(self.brilliant),
            QualityTier::Brilliant => None,
        }
    }

    fn is_valid(&self) -> bool {
        0.0 < self.dubious
            && self.dubious < self.good
            && self.good < self.excellent
            && self.excellent < self.brilliant
            && self.brilliant <= 100.0
    }
}

/// Threshold ladders keyed by game phase, with a fallback for phases that
/// have no entry of their own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    #[serde(default)]
    pub default: TierThresholds,
    #[serde(default)]
    pub by_phase: BTreeMap<GamePhase, TierThresholds>,
}

impl ThresholdTable {
    pub fn with_phase(mut self, phase: GamePhase, thresholds: TierThresholds) -> Self {
        self.by_phase.insert(phase, thresholds);
        self
    }

    pub fn for_phase(&self, phase: GamePhase) -> &TierThresholds {
        match phase {
            GamePhase::Unknown => &self.default,
            _ => self.by_phase.get(&phase).unwrap_or(&self.default),
        }
    }

    pub fn tier_for(&self, score: f64, phase: GamePhase) -> QualityTier {
        self.for_phase(phase).tier_for(score)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default.is_valid() {
            return Err(ConfigError::InvalidThresholds {
                phase: "default".to_string(),
            });
        }
        for (phase, thresholds) in &self.by_phase {
            if !thresholds.is_valid() {
                return Err(ConfigError::InvalidThresholds {
                    phase: phase.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Relative weight of each engine category in the composite score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub pattern: f64,
    pub strategic: f64,
    pub risk: f64,
    pub board_impact: f64,
    pub opponent_denial: f64,
    pub timing: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            pattern: 0.25,
            strategic: 0.25,
            risk: 0.15,
            board_impact: 0.15,
            opponent_denial: 0.10,
            timing: 0.10,
        }
    }
}

impl CategoryWeights {
    pub fn weight(&self, category: EngineCategory) -> f64 {
        match category {
            EngineCategory::Pattern => self.pattern,
            EngineCategory::Strategic => self.strategic,
            EngineCategory::Risk => self.risk,
            EngineCategory::BoardImpact => self.board_impact,
            EngineCategory::OpponentDenial => self.opponent_denial,
            EngineCategory::Timing => self.timing,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut total = 0.0;
        for category in EngineCategory::ALL.iter().copied() {
            let weight = self.weight(category);
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeights(format!(
                    "{} weight is {}",
                    category, weight
                )));
            }
            total += weight;
        }
        if total <= 0.0 {
            return Err(ConfigError::InvalidWeights(
                "weights sum to zero".to_string(),
            ));
        }
        Ok(())
    }
}
