use thiserror::Error;
use uuid::Uuid;

use crate::analysis::ConfigError;
use crate::store::StoreError;

use super::session::SessionStatus;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session failed: {0}")]
    Fatal(String),
    #[error("Session {0} not found")]
    NotFound(Uuid),
    #[error("Session {0} already exists")]
    AlreadyExists(Uuid),
    #[error("Session {0} is still running")]
    StillRunning(Uuid),
    #[error("Cannot move a session from {from} to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SessionNotFound(id) => SessionError::NotFound(id),
            other => SessionError::Store(other),
        }
    }
}
