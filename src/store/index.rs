//! In-memory indexes shared by the store backends.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::session::AnalysisSession;

use super::records::{join, MoveRecord, PositionRecord, StoredPosition};

type PositionKey = (Uuid, u64);

#[derive(Default)]
pub struct StoreIndex {
    sessions: BTreeMap<Uuid, AnalysisSession>,
    positions: BTreeMap<PositionKey, PositionRecord>,
    moves: BTreeMap<PositionKey, Vec<MoveRecord>>,
    by_position_id: FxHashMap<String, Vec<PositionKey>>,
}

impl StoreIndex {
    pub fn put_session(&mut self, session: AnalysisSession) {
        self.sessions.insert(session.id, session);
    }

    pub fn session(&self, id: Uuid) -> Option<&AnalysisSession> {
        self.sessions.get(&id)
    }

    /// Sessions oldest first.
    pub fn sessions(&self) -> Vec<AnalysisSession> {
        let mut sessions: Vec<AnalysisSession> = self.sessions.values().cloned().collect();
        sessions.sort_by_key(|session| session.created_at);
        sessions
    }

    pub fn put_position(&mut self, position: PositionRecord, moves: Vec<MoveRecord>) {
        let key = (position.session_id, position.sequence);
        if let Some(previous) = self.positions.get(&key) {
            if previous.position_id != position.position_id {
                if let Some(keys) = self.by_position_id.get_mut(&previous.position_id) {
                    keys.retain(|existing| *existing != key);
                }
            }
        }
        let keys = self
            .by_position_id
            .entry(position.position_id.clone())
            .or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
        self.moves.insert(key, moves);
        self.positions.insert(key, position);
    }

    pub fn remove_session(&mut self, id: Uuid) -> bool {
        let existed = self.sessions.remove(&id).is_some();
        self.positions.retain(|(session_id, _), _| *session_id != id);
        self.moves.retain(|(session_id, _), _| *session_id != id);
        for keys in self.by_position_id.values_mut() {
            keys.retain(|(session_id, _)| *session_id != id);
        }
        self.by_position_id.retain(|_, keys| !keys.is_empty());
        existed
    }

    /// Positions of one session in the order they were analyzed.
    pub fn positions_for_session(&self, id: Uuid) -> Vec<StoredPosition> {
        self.positions
            .range((id, 0)..=(id, u64::MAX))
            .map(|(key, position)| join(position, self.moves_at(key)))
            .collect()
    }

    pub fn positions_by_id(&self, position_id: &str) -> Vec<StoredPosition> {
        self.by_position_id
            .get(position_id)
            .map(|keys| {
                keys.iter()
                    .filter_map(|key| {
                        let position = self.positions.get(key)?;
                        Some(join(position, self.moves_at(key)))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Move records ranked by quality, best first, optionally within one session.
    pub fn top_moves(&self, session: Option<Uuid>, limit: usize) -> Vec<MoveRecord> {
        let mut moves: Vec<&MoveRecord> = self
            .moves
            .iter()
            .filter(|((session_id, _), _)| session.map_or(true, |id| id == *session_id))
            .flat_map(|(_, records)| records.iter())
            .collect();
        moves.sort_by(|a, b| {
            b.assessment
                .quality_score
                .partial_cmp(&a.assessment.quality_score)
                .unwrap_or(Ordering::Equal)
        });
        moves.into_iter().take(limit).cloned().collect()
    }

    pub fn position_records(&self) -> impl Iterator<Item = &PositionRecord> {
        self.positions.values()
    }

    pub fn move_records(&self) -> impl Iterator<Item = &MoveRecord> {
        self.moves.values().flat_map(|records| records.iter())
    }

    fn moves_at(&self, key: &PositionKey) -> &[MoveRecord] {
        self.moves.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}
