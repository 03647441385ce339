use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use crate::analysis::PositionAnalysis;
use crate::session::AnalysisSession;

use super::index::StoreIndex;
use super::records::{split, MoveRecord, StoredPosition};
use super::{ResultStore, StoreError};

/// Non-durable store, for tests and one-off analyses.
#[derive(Default)]
pub struct MemoryStore {
    index: RwLock<StoreIndex>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryStore {
    fn save_session(&self, session: &AnalysisSession) -> Result<(), StoreError> {
        self.index
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .put_session(session.clone());
        Ok(())
    }

    fn load_session(&self, id: Uuid) -> Result<AnalysisSession, StoreError> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session(id)
            .cloned()
            .ok_or(StoreError::SessionNotFound(id))
    }

    fn list_sessions(&self) -> Result<Vec<AnalysisSession>, StoreError> {
        Ok(self
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sessions())
    }

    fn delete_session(&self, id: Uuid) -> Result<(), StoreError> {
        let removed = self
            .index
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove_session(id);
        if removed {
            Ok(())
        } else {
            Err(StoreError::SessionNotFound(id))
        }
    }

    fn save_position(
        &self,
        session_id: Uuid,
        sequence: u64,
        analysis: &PositionAnalysis,
    ) -> Result<(), StoreError> {
        let (position, moves) = split(session_id, sequence, analysis);
        self.index
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .put_position(position, moves);
        Ok(())
    }

    fn positions_for_session(&self, id: Uuid) -> Result<Vec<StoredPosition>, StoreError> {
        Ok(self
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .positions_for_session(id))
    }

    fn positions_by_id(&self, position_id: &str) -> Result<Vec<StoredPosition>, StoreError> {
        Ok(self
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .positions_by_id(position_id))
    }

    fn top_moves(&self, session: Option<Uuid>, limit: usize) -> Result<Vec<MoveRecord>, StoreError> {
        Ok(self
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .top_moves(session, limit))
    }
}
