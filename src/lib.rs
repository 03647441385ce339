//! Move-quality analysis for Azul positions.
//!
//! A position's legal moves are enumerated, scored by a panel of independent
//! evaluation engines, folded into a 0..=100 quality score with a tier, and
//! summarized per position. Batch sessions run those analyses over streams
//! of positions and persist the results.

pub mod analysis;
pub mod azul_move;
pub mod engine;
pub mod game;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
