//! The three persisted record kinds: sessions, positions and moves.
//!
//! A position analysis is split into one [`PositionRecord`] and one
//! [`MoveRecord`] per assessed move, linked by `(session_id, sequence)`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{MoveQualityAssessment, PositionAnalysis, PositionStatistics};
use crate::engine::EngineTally;
use crate::game::GamePhase;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub session_id: Uuid,
    /// Order in which the session consumed the position, from 0.
    pub sequence: u64,
    pub position_id: String,
    pub phase: GamePhase,
    pub player: usize,
    pub statistics: PositionStatistics,
    pub engine_outcomes: BTreeMap<String, EngineTally>,
    pub truncated: bool,
    pub attempts: u32,
    pub analyzed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub session_id: Uuid,
    pub sequence: u64,
    pub position_id: String,
    pub move_index: usize,
    pub assessment: MoveQualityAssessment,
}

/// A position analysis as stored, with the session it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredPosition {
    pub session_id: Uuid,
    pub sequence: u64,
    pub analysis: PositionAnalysis,
}

pub fn split(
    session_id: Uuid,
    sequence: u64,
    analysis: &PositionAnalysis,
) -> (PositionRecord, Vec<MoveRecord>) {
    let moves = analysis
        .assessments
        .iter()
        .enumerate()
        .map(|(move_index, assessment)| MoveRecord {
            session_id,
            sequence,
            position_id: analysis.position_id.clone(),
            move_index,
            assessment: assessment.clone(),
        })
        .collect();
    let position = PositionRecord {
        session_id,
        sequence,
        position_id: analysis.position_id.clone(),
        phase: analysis.phase,
        player: analysis.player,
        statistics: analysis.statistics.clone(),
        engine_outcomes: analysis.engine_outcomes.clone(),
        truncated: analysis.truncated,
        attempts: analysis.attempts,
        analyzed_at: analysis.analyzed_at,
        duration_ms: analysis.duration_ms,
    };
    (position, moves)
}

pub fn join(position: &PositionRecord, moves: &[MoveRecord]) -> StoredPosition {
    let mut moves: Vec<&MoveRecord> = moves.iter().collect();
    moves.sort_by_key(|record| record.move_index);
    StoredPosition {
        session_id: position.session_id,
        sequence: position.sequence,
        analysis: PositionAnalysis {
            position_id: position.position_id.clone(),
            phase: position.phase,
            player: position.player,
            assessments: moves.into_iter().map(|m| m.assessment.clone()).collect(),
            statistics: position.statistics.clone(),
            engine_outcomes: position.engine_outcomes.clone(),
            truncated: position.truncated,
            attempts: position.attempts,
            analyzed_at: position.analyzed_at,
            duration_ms: position.duration_ms,
        },
    }
}
