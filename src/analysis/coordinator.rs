//! Scores one move with every enabled engine and folds the results into a
//! [`MoveQualityAssessment`].
//!
//! Engines run in parallel on the coordinator's rayon pool. Each engine's
//! outcome is independent, and the coordinator always produces an
//! assessment: when no engine succeeds the move gets the configured default
//! score.
//!
//! The composite is a weighted mean over categories. A category's signal is
//! the mean of its successful engines; categories with no successful engine
//! drop out of both the numerator and the denominator.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::azul_move::AzulMove;
use crate::engine::{EngineAdapter, EngineCategory, EngineScore, EngineSet};
use crate::game::{AzulState, GamePhase};

use super::assessment::MoveQualityAssessment;
use super::cache::ScoreCache;
use super::quality::{CategoryWeights, ThresholdTable};

pub const DEFAULT_SCORE: f64 = 0.0;

pub struct MoveCoordinator {
    pool: ThreadPool,
    thresholds: ThresholdTable,
    default_score: f64,
    cache: Option<Arc<ScoreCache>>,
}

impl MoveCoordinator {
    pub fn new(worker_count: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count.max(1))
            .thread_name(|index| format!("coordinator-{}", index))
            .build()?;
        Ok(Self {
            pool,
            thresholds: ThresholdTable::default(),
            default_score: DEFAULT_SCORE,
            cache: None,
        })
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdTable) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_default_score(mut self, default_score: f64) -> Self {
        self.default_score = default_score.max(0.0).min(100.0);
        self
    }

    pub fn with_cache(mut self, cache: Arc<ScoreCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn assess(
        &self,
        state: &AzulState,
        phase: GamePhase,
        azul_move: &AzulMove,
        engines: &EngineSet,
        weights: &CategoryWeights,
    ) -> MoveQualityAssessment {
        let enabled = engines.enabled();
        let position_hash = state.position_hash();

        let outcomes: Vec<(String, EngineCategory, EngineScore)> = self.pool.install(|| {
            enabled
                .par_iter()
                .map(|adapter| {
                    let score = self.score_with(adapter, state, position_hash, azul_move);
                    (adapter.name().to_string(), adapter.category(), score)
                })
                .collect()
        });

        self.fold(phase, azul_move, outcomes, weights)
    }

    fn score_with(
        &self,
        adapter: &EngineAdapter,
        state: &AzulState,
        position_hash: u64,
        azul_move: &AzulMove,
    ) -> EngineScore {
        if let Some(cache) = &self.cache {
            if let Some(score) = cache.get(position_hash, azul_move, adapter.name()) {
                return score;
            }
        }
        let score = adapter.evaluate(state, azul_move, adapter.time_budget());
        if let Some(cache) = &self.cache {
            cache.insert(position_hash, azul_move, adapter.name(), &score);
        }
        score
    }

    fn fold(
        &self,
        phase: GamePhase,
        azul_move: &AzulMove,
        outcomes: Vec<(String, EngineCategory, EngineScore)>,
        weights: &CategoryWeights,
    ) -> MoveQualityAssessment {
        let mut by_category: BTreeMap<EngineCategory, Vec<f64>> = BTreeMap::new();
        let mut enabled_categories = Vec::new();
        let mut engines_used = Vec::new();
        let mut failed = Vec::new();
        let mut engine_scores = BTreeMap::new();

        for (name, category, score) in outcomes {
            if !enabled_categories.contains(&category) {
                enabled_categories.push(category);
            }
            match &score {
                EngineScore::Success { value, .. } => {
                    by_category.entry(category).or_default().push(*value);
                    engines_used.push(name.clone());
                }
                EngineScore::Failure { reason } => failed.push(format!("{} ({})", name, reason)),
            }
            engine_scores.insert(name, score);
        }

        let category_means: BTreeMap<EngineCategory, f64> = by_category
            .iter()
            .map(|(category, values)| (*category, mean(values)))
            .collect();

        let enabled_weight: f64 = enabled_categories
            .iter()
            .map(|category| weights.weight(*category))
            .sum();
        let succeeded_weight: f64 = category_means
            .keys()
            .map(|category| weights.weight(*category))
            .sum();
        let weighted_sum: f64 = category_means
            .iter()
            .map(|(category, value)| weights.weight(*category) * value)
            .sum();

        let raw_score = if succeeded_weight > 0.0 {
            weighted_sum / succeeded_weight
        } else {
            self.default_score
        };
        let quality_score = raw_score.max(0.0).min(100.0);
        let confidence = if enabled_weight > 0.0 {
            succeeded_weight / enabled_weight
        } else {
            0.0
        };
        let tier = self.thresholds.tier_for(quality_score, phase);

        let mut explanation = if engines_used.is_empty() {
            format!(
                "{}: no engine produced a score, default {:.1} ({})",
                azul_move, quality_score, tier
            )
        } else {
            format!(
                "{}: {} at {:.1} from {}",
                azul_move,
                tier,
                quality_score,
                engines_used.join(", ")
            )
        };
        if !failed.is_empty() {
            explanation.push_str(&format!("; failed: {}", failed.join(", ")));
        }
        debug!("{}", explanation);

        MoveQualityAssessment {
            azul_move: *azul_move,
            engine_scores,
            engines_used,
            quality_score,
            tier,
            confidence,
            tactical_score: category_means.get(&EngineCategory::Pattern).copied(),
            strategic_score: category_means.get(&EngineCategory::Strategic).copied(),
            risk_score: category_means.get(&EngineCategory::Risk).copied(),
            explanation,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
