//! Drives the enumerator and the coordinator over one position.
//!
//! A position either yields a complete [`PositionAnalysis`] (possibly
//! truncated by its time budget) or a [`PositionAnalysisError`]. The
//! evaluation loop runs under `catch_unwind`; a fault inside it is retried
//! according to the [`RetryPolicy`] before it is surfaced.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::azul_move::{EnumeratorConfig, MoveEnumerator};
use crate::engine::adapter::panic_message;
use crate::engine::{EngineSet, EngineTally};
use crate::game::{AzulState, GamePhase, Rules};

use super::assessment::MoveQualityAssessment;
use super::coordinator::MoveCoordinator;
use super::error::{ConfigError, PositionAnalysisError};
use super::quality::CategoryWeights;
use super::retry::RetryPolicy;
use super::statistics::PositionStatistics;

/// Per-position knobs, read-only for the duration of a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub enumerator: EnumeratorConfig,
    pub weights: CategoryWeights,
    pub position_time_budget_ms: Option<u64>,
    pub retry: RetryPolicy,
}

impl AnalysisSettings {
    pub fn position_time_budget(&self) -> Option<Duration> {
        self.position_time_budget_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.retry.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionAnalysis {
    /// Canonical notation of the analyzed position.
    pub position_id: String,
    pub phase: GamePhase,
    pub player: usize,
    /// In enumeration order.
    pub assessments: Vec<MoveQualityAssessment>,
    pub statistics: PositionStatistics,
    pub engine_outcomes: BTreeMap<String, EngineTally>,
    /// Set when the position time budget ran out before every move was scored.
    pub truncated: bool,
    pub attempts: u32,
    pub analyzed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl PositionAnalysis {
    pub fn best(&self) -> Option<&MoveQualityAssessment> {
        self.statistics
            .best_move_index
            .and_then(|index| self.assessments.get(index))
    }

    /// Assessments sorted best first; ties keep enumeration order.
    pub fn ranked(&self) -> Vec<&MoveQualityAssessment> {
        let mut ranked: Vec<_> = self.assessments.iter().collect();
        ranked.sort_by(|a, b| {
            b.quality_score
                .partial_cmp(&a.quality_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

pub struct PositionAnalyzer {
    rules: Arc<dyn Rules>,
    coordinator: MoveCoordinator,
}

impl PositionAnalyzer {
    pub fn new(rules: Arc<dyn Rules>, coordinator: MoveCoordinator) -> Self {
        Self { rules, coordinator }
    }

    pub fn coordinator(&self) -> &MoveCoordinator {
        &self.coordinator
    }

    pub fn analyze(
        &self,
        state: &AzulState,
        phase: GamePhase,
        engines: &EngineSet,
        settings: &AnalysisSettings,
    ) -> Result<PositionAnalysis, PositionAnalysisError> {
        self.rules
            .validate(state)
            .map_err(|err| PositionAnalysisError::MalformedPosition(err.to_string()))?;

        let max_attempts = settings.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(state, phase, engines, settings) {
                Ok(mut analysis) => {
                    analysis.attempts = attempt;
                    return Ok(analysis);
                }
                Err(PositionAnalysisError::Internal(reason)) if attempt < max_attempts => {
                    let delay = settings.retry.backoff(attempt);
                    warn!(
                        "Attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, max_attempts, reason, delay
                    );
                    thread::sleep(delay);
                }
                Err(PositionAnalysisError::Internal(reason)) => {
                    return Err(PositionAnalysisError::RetriesExhausted {
                        attempts: attempt,
                        last_error: reason,
                    })
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Parses `encoding` and analyzes it; without an explicit phase the
    /// position is classified.
    pub fn analyze_encoded(
        &self,
        encoding: &str,
        phase: Option<GamePhase>,
        engines: &EngineSet,
        settings: &AnalysisSettings,
    ) -> Result<PositionAnalysis, PositionAnalysisError> {
        let state: AzulState = encoding
            .trim()
            .parse()
            .map_err(|err| PositionAnalysisError::MalformedPosition(format!("{}", err)))?;
        let phase = phase.unwrap_or_else(|| GamePhase::classify(&state));
        self.analyze(&state, phase, engines, settings)
    }

    fn attempt(
        &self,
        state: &AzulState,
        phase: GamePhase,
        engines: &EngineSet,
        settings: &AnalysisSettings,
    ) -> Result<PositionAnalysis, PositionAnalysisError> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            self.evaluate_moves(state, phase, engines, settings)
        }))
        .map_err(|payload| PositionAnalysisError::Internal(panic_message(payload.as_ref())))
    }

    fn evaluate_moves(
        &self,
        state: &AzulState,
        phase: GamePhase,
        engines: &EngineSet,
        settings: &AnalysisSettings,
    ) -> PositionAnalysis {
        let started = Instant::now();
        let moves = MoveEnumerator::new(self.rules.as_ref(), settings.enumerator)
            .enumerate(state);
        debug!("Analyzing {} moves in {:?} position", moves.len(), phase);

        let budget = settings.position_time_budget();
        let mut truncated = false;
        let mut assessments = Vec::with_capacity(moves.len());
        for azul_move in &moves {
            if budget.map_or(false, |budget| started.elapsed() >= budget) {
                truncated = true;
                warn!(
                    "Position time budget exhausted after {}/{} moves",
                    assessments.len(),
                    moves.len()
                );
                break;
            }
            assessments.push(self.coordinator.assess(
                state,
                phase,
                azul_move,
                engines,
                &settings.weights,
            ));
        }

        let mut engine_outcomes: BTreeMap<String, EngineTally> = engines
            .enabled()
            .iter()
            .map(|adapter| (adapter.name().to_string(), EngineTally::default()))
            .collect();
        for assessment in &assessments {
            for (name, score) in &assessment.engine_scores {
                engine_outcomes.entry(name.clone()).or_default().record(score);
            }
        }

        PositionAnalysis {
            position_id: state.to_string(),
            phase,
            player: state.current_player,
            statistics: PositionStatistics::compute(&assessments),
            assessments,
            engine_outcomes,
            truncated,
            attempts: 1,
            analyzed_at: Utc::now(),
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}
