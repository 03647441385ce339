//! Batch sessions: many positions analyzed under one profile, persisted as
//! they complete.

pub mod config;
mod error;
pub mod manager;
pub mod profile;
pub mod runner;
#[allow(clippy::module_inception)]
pub mod session;
pub mod source;

#[cfg(test)]
mod tests;

pub use config::{AnalysisConfig, EngineOverride};
pub use error::SessionError;
pub use manager::{SessionManager, SessionRequest, SessionSummary};
pub use profile::{AnalysisProfile, ProfilePreset};
pub use session::{AnalysisSession, SessionProgress, SessionStatus};
pub use source::{FilePositions, PositionInput, PositionSource, RandomPositions, SourceSpec};
