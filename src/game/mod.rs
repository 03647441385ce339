//! The Azul game model consumed by the analysis pipeline: tiles, positions,
//! the rules collaborator and the canonical position notation.

mod error;
pub mod notation;
pub mod phase;
pub mod rules;
pub mod state;
pub mod tile;


pub use error::RulesError;
pub use notation::NotationError;
pub use phase::GamePhase;
pub use rules::{AzulRules, Rules};
pub use state::{AzulState, PatternLine, PlayerBoard};
pub use tile::{TileColor, TileCounts};
