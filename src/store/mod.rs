//! Durable, queryable storage for sessions and their position analyses.

mod index;
pub mod jsonl;
pub mod memory;
pub mod records;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::analysis::PositionAnalysis;
use crate::session::AnalysisSession;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use records::{MoveRecord, PositionRecord, StoredPosition};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not serialize record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt record at {path}:{line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),
}

/// Writes happen one position at a time; a position and its moves become
/// visible together.
pub trait ResultStore: Send + Sync {
    /// Inserts or replaces the session record.
    fn save_session(&self, session: &AnalysisSession) -> Result<(), StoreError>;

    fn load_session(&self, id: Uuid) -> Result<AnalysisSession, StoreError>;

    fn list_sessions(&self) -> Result<Vec<AnalysisSession>, StoreError>;

    /// Removes the session and every position and move recorded under it.
    fn delete_session(&self, id: Uuid) -> Result<(), StoreError>;

    fn save_position(
        &self,
        session_id: Uuid,
        sequence: u64,
        analysis: &PositionAnalysis,
    ) -> Result<(), StoreError>;

    fn positions_for_session(&self, id: Uuid) -> Result<Vec<StoredPosition>, StoreError>;

    fn positions_by_id(&self, position_id: &str) -> Result<Vec<StoredPosition>, StoreError>;

    fn top_moves(&self, session: Option<Uuid>, limit: usize) -> Result<Vec<MoveRecord>, StoreError>;
}
