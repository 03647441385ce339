//! Analysis-depth presets. A profile only changes configuration: how many
//! moves are considered, how long each engine may take and which engines run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::ConfigError;
use crate::azul_move::EnumeratorConfig;
use crate::engine::BuiltinEngine;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisProfile {
    Quick,
    Standard,
    Deep,
    Exhaustive,
}

impl Default for AnalysisProfile {
    fn default() -> Self {
        AnalysisProfile::Standard
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProfilePreset {
    pub max_moves: Option<usize>,
    pub engine_time_budget_ms: u64,
    pub engines: Vec<BuiltinEngine>,
    pub search_depth: u8,
    pub rollouts: u32,
    pub filter_dominated: bool,
    pub prioritize: bool,
}

impl ProfilePreset {
    pub fn enumerator(&self) -> EnumeratorConfig {
        EnumeratorConfig {
            filter_dominated: self.filter_dominated,
            prioritize: self.prioritize,
            max_moves: self.max_moves,
        }
    }
}

impl AnalysisProfile {
    pub const ALL: [AnalysisProfile; 4] = [
        AnalysisProfile::Quick,
        AnalysisProfile::Standard,
        AnalysisProfile::Deep,
        AnalysisProfile::Exhaustive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnalysisProfile::Quick => "quick",
            AnalysisProfile::Standard => "standard",
            AnalysisProfile::Deep => "deep",
            AnalysisProfile::Exhaustive => "exhaustive",
        }
    }

    pub fn preset(self) -> ProfilePreset {
        use BuiltinEngine::*;
        match self {
            AnalysisProfile::Quick => ProfilePreset {
                max_moves: Some(20),
                engine_time_budget_ms: 100,
                engines: vec![Pattern, Risk, Timing],
                search_depth: 1,
                rollouts: 4,
                filter_dominated: true,
                prioritize: true,
            },
            AnalysisProfile::Standard => ProfilePreset {
                max_moves: Some(60),
                engine_time_budget_ms: 500,
                engines: vec![Pattern, Search, Risk, Denial, Timing],
                search_depth: 1,
                rollouts: 8,
                filter_dominated: true,
                prioritize: true,
            },
            AnalysisProfile::Deep => ProfilePreset {
                max_moves: Some(150),
                engine_time_budget_ms: 2_000,
                engines: vec![Pattern, Search, Simulation, Risk, Denial, Timing],
                search_depth: 2,
                rollouts: 16,
                filter_dominated: true,
                prioritize: true,
            },
            AnalysisProfile::Exhaustive => ProfilePreset {
                max_moves: None,
                engine_time_budget_ms: 5_000,
                engines: BuiltinEngine::ALL.to_vec(),
                search_depth: 3,
                rollouts: 32,
                filter_dominated: false,
                prioritize: false,
            },
        }
    }
}

impl fmt::Display for AnalysisProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AnalysisProfile {
    type Err = ConfigError;
    fn from_str(profile: &str) -> Result<Self, Self::Err> {
        AnalysisProfile::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.name() == profile)
            .ok_or_else(|| ConfigError::UnknownProfile(profile.to_string()))
    }
}
