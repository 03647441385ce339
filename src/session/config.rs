use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rayon::ThreadPoolBuildError;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    AnalysisSettings, CategoryWeights, ConfigError, MoveCoordinator, RetryPolicy, ScoreCache,
    ThresholdTable,
};
use crate::engine::{BuiltinEngine, BuiltinSettings, EngineAdapter, EngineSet};
use crate::game::Rules;

use super::profile::AnalysisProfile;

pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_CACHE_CAPACITY: usize = 4_096;

/// Overrides for one built-in engine, on top of the profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOverride {
    pub enabled: Option<bool>,
    pub time_budget_ms: Option<u64>,
}

/// Everything a session needs to know, fixed when the session starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub profile: AnalysisProfile,
    pub weights: CategoryWeights,
    pub thresholds: ThresholdTable,
    pub retry: RetryPolicy,
    pub worker_count: usize,
    /// Zero disables the score cache.
    pub cache_capacity: usize,
    pub position_time_budget_ms: Option<u64>,
    pub default_score: f64,
    pub seed: u64,
    pub engines: BTreeMap<String, EngineOverride>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::for_profile(AnalysisProfile::default())
    }
}

impl AnalysisConfig {
    pub fn for_profile(profile: AnalysisProfile) -> Self {
        Self {
            profile,
            weights: CategoryWeights::default(),
            thresholds: ThresholdTable::default(),
            retry: RetryPolicy::default(),
            worker_count: DEFAULT_WORKER_COUNT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            position_time_budget_ms: None,
            default_score: 0.0,
            seed: 0,
            engines: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        self.weights.validate()?;
        self.thresholds.validate()?;
        self.retry.validate()?;
        for name in self.engines.keys() {
            BuiltinEngine::from_str(name).map_err(|_| ConfigError::UnknownEngine(name.clone()))?;
        }
        Ok(())
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            enumerator: self.profile.preset().enumerator(),
            weights: self.weights,
            position_time_budget_ms: self.position_time_budget_ms,
            retry: self.retry.clone(),
        }
    }

    pub fn builtin_settings(&self) -> BuiltinSettings {
        let preset = self.profile.preset();
        BuiltinSettings {
            search_depth: preset.search_depth,
            rollouts: preset.rollouts,
            seed: self.seed,
            ..BuiltinSettings::default()
        }
    }

    /// Adapters for every built-in engine, switched on and budgeted per the
    /// profile and the overrides.
    pub fn engine_set(&self, rules: Arc<dyn Rules>) -> EngineSet {
        let preset = self.profile.preset();
        let settings = self.builtin_settings();
        let mut engines = EngineSet::new();
        for engine in BuiltinEngine::ALL.iter().copied() {
            let overrides = self.engines.get(engine.name()).cloned().unwrap_or_default();
            let enabled = overrides
                .enabled
                .unwrap_or_else(|| preset.engines.contains(&engine));
            let budget = overrides
                .time_budget_ms
                .unwrap_or(preset.engine_time_budget_ms);
            engines.push(
                EngineAdapter::new(
                    engine.name(),
                    engine.category(),
                    settings.build(engine, Arc::clone(&rules)),
                    Arc::clone(&rules),
                )
                .with_time_budget(Duration::from_millis(budget))
                .with_enabled(enabled),
            );
        }
        engines
    }

    pub fn score_cache(&self) -> Option<Arc<ScoreCache>> {
        ScoreCache::new(self.cache_capacity).map(Arc::new)
    }

    pub fn coordinator(
        &self,
        cache: Option<Arc<ScoreCache>>,
    ) -> Result<MoveCoordinator, ThreadPoolBuildError> {
        let coordinator = MoveCoordinator::new(self.worker_count)?
            .with_thresholds(self.thresholds.clone())
            .with_default_score(self.default_score);
        Ok(match cache {
            Some(cache) => coordinator.with_cache(cache),
            None => coordinator,
        })
    }
}
