//! The session record, its lifecycle and the progress snapshot readers see.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{PositionAnalysis, QualityTier};
use crate::engine::EngineTally;

use super::config::AnalysisConfig;
use super::error::SessionError;
use super::profile::AnalysisProfile;
use super::source::SourceSpec;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Created,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl SessionStatus {
    /// Stopped and failed sessions may be resumed into a new running phase.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Created, Running)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Stopped)
                | (Stopped, Running)
                | (Failed, Running)
        )
    }

    pub fn is_finished(self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Stopped
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            SessionStatus::Created => "created",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Stopped => "stopped",
        };
        write!(f, "{}", status_str)
    }
}

/// One batch run. Only the session's own thread writes to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub id: Uuid,
    pub profile: AnalysisProfile,
    pub config: AnalysisConfig,
    pub source: Option<SourceSpec>,
    pub status: SessionStatus,
    pub target_count: u64,
    pub worker_count: usize,
    pub positions_analyzed: u64,
    pub positions_failed: u64,
    pub in_progress: u64,
    pub moves_assessed: u64,
    pub quality_sum: f64,
    pub tier_totals: BTreeMap<QualityTier, u64>,
    pub engine_tallies: BTreeMap<String, EngineTally>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
}

impl AnalysisSession {
    pub fn new(id: Uuid, config: AnalysisConfig, target_count: u64) -> Self {
        Self {
            id,
            profile: config.profile,
            worker_count: config.worker_count,
            config,
            source: None,
            status: SessionStatus::Created,
            target_count,
            positions_analyzed: 0,
            positions_failed: 0,
            in_progress: 0,
            moves_assessed: 0,
            quality_sum: 0.0,
            tier_totals: QualityTier::ALL.iter().map(|&tier| (tier, 0)).collect(),
            engine_tallies: BTreeMap::new(),
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            failure_reason: None,
        }
    }

    pub fn transition(&mut self, next: SessionStatus) -> Result<(), SessionError> {
        if !self.status.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        match next {
            SessionStatus::Running => {
                self.started_at.get_or_insert_with(Utc::now);
                self.finished_at = None;
                self.failure_reason = None;
            }
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Stopped => {
                self.finished_at = Some(Utc::now());
                self.in_progress = 0;
            }
            SessionStatus::Created => {}
        }
        self.status = next;
        Ok(())
    }

    /// Positions pulled from the source so far, whatever their outcome.
    pub fn positions_consumed(&self) -> u64 {
        self.positions_analyzed + self.positions_failed
    }

    pub fn record_analysis(&mut self, analysis: &PositionAnalysis) {
        self.positions_analyzed += 1;
        for assessment in &analysis.assessments {
            self.moves_assessed += 1;
            self.quality_sum += assessment.quality_score;
            *self.tier_totals.entry(assessment.tier).or_insert(0) += 1;
        }
        for (engine, tally) in &analysis.engine_outcomes {
            self.engine_tallies
                .entry(engine.clone())
                .or_default()
                .merge(tally);
        }
    }

    pub fn record_failure(&mut self) {
        self.positions_failed += 1;
    }

    pub fn mean_quality(&self) -> Option<f64> {
        if self.moves_assessed == 0 {
            None
        } else {
            Some(self.quality_sum / self.moves_assessed as f64)
        }
    }

    pub fn success_rate(&self) -> f64 {
        match self.positions_consumed() {
            0 => 0.0,
            consumed => self.positions_analyzed as f64 / consumed as f64,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self.started_at {
            Some(started) => {
                let end = self.finished_at.unwrap_or_else(Utc::now);
                (end - started).num_milliseconds().max(0) as u64
            }
            None => 0,
        }
    }
}

/// Read-only view of a session, swapped in whole after every position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub id: Uuid,
    pub profile: AnalysisProfile,
    pub status: SessionStatus,
    pub positions_analyzed: u64,
    pub positions_failed: u64,
    pub in_progress: u64,
    pub target_count: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_ms: u64,
    pub percent_complete: f64,
    pub success_rate: f64,
    pub mean_quality: Option<f64>,
    pub tier_distribution: BTreeMap<QualityTier, u64>,
}

impl SessionProgress {
    pub fn of(session: &AnalysisSession) -> Self {
        let percent_complete = if session.target_count == 0 {
            100.0
        } else {
            (100.0 * session.positions_consumed() as f64 / session.target_count as f64).min(100.0)
        };
        Self {
            id: session.id,
            profile: session.profile,
            status: session.status,
            positions_analyzed: session.positions_analyzed,
            positions_failed: session.positions_failed,
            in_progress: session.in_progress,
            target_count: session.target_count,
            started_at: session.started_at,
            elapsed_ms: session.elapsed_ms(),
            percent_complete,
            success_rate: session.success_rate(),
            mean_quality: session.mean_quality(),
            tier_distribution: session.tier_totals.clone(),
        }
    }

    /// Brings `elapsed_ms` up to date for a session that is still running.
    pub fn refreshed(mut self) -> Self {
        if let (SessionStatus::Running, Some(started)) = (self.status, self.started_at) {
            self.elapsed_ms = (Utc::now() - started).num_milliseconds().max(0) as u64;
        }
        self
    }
}
