//! Move- and position-level analysis: the coordinator that folds engine
//! scores into a verdict and the orchestrator that runs it over a position.

pub mod assessment;
pub mod cache;
pub mod coordinator;
mod error;
pub mod orchestrator;
pub mod quality;
pub mod retry;
pub mod statistics;


pub use assessment::MoveQualityAssessment;
pub use cache::ScoreCache;
pub use coordinator::MoveCoordinator;
pub use error::{ConfigError, PositionAnalysisError};
pub use orchestrator::{AnalysisSettings, PositionAnalysis, PositionAnalyzer};
pub use quality::{CategoryWeights, QualityTier, ThresholdTable, TierThresholds};
pub use retry::RetryPolicy;
pub use statistics::PositionStatistics;
