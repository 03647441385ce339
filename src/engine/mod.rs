//! Evaluation engines and the adapters that isolate them.

pub mod adapter;
pub mod denial;
pub mod evaluator;
pub mod heuristics;
pub mod pattern;
pub mod risk;
pub mod score;
pub mod search;
pub mod simulation;
pub mod timing;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::Rules;

pub use adapter::{AdapterMetrics, EngineAdapter};
pub use evaluator::{EngineFault, EngineValue, EvaluationInput, Evaluator};
pub use score::{EngineCategory, EngineScore, EngineTally, FailureKind};

/// The engines that ship with the crate.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinEngine {
    Pattern,
    Search,
    Simulation,
    Risk,
    Denial,
    Timing,
}

impl BuiltinEngine {
    pub const ALL: [BuiltinEngine; 6] = [
        BuiltinEngine::Pattern,
        BuiltinEngine::Search,
        BuiltinEngine::Simulation,
        BuiltinEngine::Risk,
        BuiltinEngine::Denial,
        BuiltinEngine::Timing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinEngine::Pattern => "pattern",
            BuiltinEngine::Search => "search",
            BuiltinEngine::Simulation => "simulation",
            BuiltinEngine::Risk => "risk",
            BuiltinEngine::Denial => "denial",
            BuiltinEngine::Timing => "timing",
        }
    }

    pub fn category(self) -> EngineCategory {
        match self {
            BuiltinEngine::Pattern => EngineCategory::Pattern,
            BuiltinEngine::Search => EngineCategory::Strategic,
            BuiltinEngine::Simulation => EngineCategory::BoardImpact,
            BuiltinEngine::Risk => EngineCategory::Risk,
            BuiltinEngine::Denial => EngineCategory::OpponentDenial,
            BuiltinEngine::Timing => EngineCategory::Timing,
        }
    }
}

impl fmt::Display for BuiltinEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

type ParseError = &'static str;
impl FromStr for BuiltinEngine {
    type Err = ParseError;
    fn from_str(engine: &str) -> Result<Self, Self::Err> {
        BuiltinEngine::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.name() == engine)
            .ok_or("invalid engine; options are: pattern, search, simulation, risk, denial, timing")
    }
}

/// Knobs for constructing the built-in engines.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltinSettings {
    pub search_depth: u8,
    pub search_branching: usize,
    pub rollouts: u32,
    pub seed: u64,
}

impl Default for BuiltinSettings {
    fn default() -> Self {
        Self {
            search_depth: 2,
            search_branching: search::DEFAULT_BRANCHING,
            rollouts: 16,
            seed: 0,
        }
    }
}

impl BuiltinSettings {
    pub fn build(&self, engine: BuiltinEngine, rules: Arc<dyn Rules>) -> Arc<dyn Evaluator> {
        match engine {
            BuiltinEngine::Pattern => Arc::new(pattern::PatternEngine),
            BuiltinEngine::Search => Arc::new(
                search::SearchEngine::new(rules, self.search_depth)
                    .with_branching(self.search_branching),
            ),
            BuiltinEngine::Simulation => Arc::new(simulation::SimulationEngine::new(
                rules,
                self.rollouts,
                self.seed,
            )),
            BuiltinEngine::Risk => Arc::new(risk::RiskEngine),
            BuiltinEngine::Denial => Arc::new(denial::DenialEngine),
            BuiltinEngine::Timing => Arc::new(timing::TimingEngine),
        }
    }
}

/// The adapters configured for a session, in a fixed order.
#[derive(Clone, Default)]
pub struct EngineSet {
    adapters: Vec<Arc<EngineAdapter>>,
}

impl EngineSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, adapter: EngineAdapter) {
        self.adapters.push(Arc::new(adapter));
    }

    pub fn with(mut self, adapter: EngineAdapter) -> Self {
        self.push(adapter);
        self
    }

    /// Adapters for every built-in engine; those not in `enabled` are
    /// present but switched off.
    pub fn builtin(
        settings: &BuiltinSettings,
        enabled: &[BuiltinEngine],
        time_budget: Duration,
        rules: Arc<dyn Rules>,
    ) -> Self {
        let mut set = Self::new();
        for engine in BuiltinEngine::ALL.iter().copied() {
            let evaluator = settings.build(engine, Arc::clone(&rules));
            set.push(
                EngineAdapter::new(engine.name(), engine.category(), evaluator, Arc::clone(&rules))
                    .with_time_budget(time_budget)
                    .with_enabled(enabled.contains(&engine)),
            );
        }
        set
    }

    pub fn all(&self) -> &[Arc<EngineAdapter>] {
        &self.adapters
    }

    pub fn enabled(&self) -> Vec<Arc<EngineAdapter>> {
        self.adapters
            .iter()
            .filter(|adapter| adapter.is_enabled())
            .cloned()
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<EngineAdapter>> {
        self.adapters.iter().find(|adapter| adapter.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.adapters
            .iter()
            .map(|adapter| adapter.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
