//! Shared fixtures for unit tests.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::analysis::{AnalysisSettings, MoveCoordinator, PositionAnalysis, PositionAnalyzer};
use crate::engine::pattern::PatternEngine;
use crate::engine::{
    EngineAdapter, EngineCategory, EngineFault, EngineSet, EngineValue, EvaluationInput,
};
use crate::game::{AzulRules, AzulState, GamePhase, Rules};
use crate::session::PositionInput;

pub const EMPTY_BOARD: &str = "0/-,-,-,-,-/ooooo.ooooo.ooooo.ooooo.ooooo/-";

/// Parses a position in canonical notation, panicking on bad fixtures.
pub fn position(notation: &str) -> AzulState {
    notation
        .parse()
        .unwrap_or_else(|err| panic!("bad fixture `{}`: {}", notation, err))
}

pub fn two_player(factories: &str, center: &str, boards: [&str; 2]) -> AzulState {
    position(&format!(
        "2:0:1:live {} {} 20.20.20.20.20 0.0.0.0.0 {}|{}",
        factories, center, boards[0], boards[1]
    ))
}

pub fn new_game(seed: u64) -> AzulState {
    AzulState::new_game(2, &mut StdRng::seed_from_u64(seed)).unwrap()
}

/// Center holds five blue, four yellow, one red and one black tile: exactly
/// fifty moves before filtering.
pub fn fifty_move_position() -> AzulState {
    two_player("-,-,-,-,-", "bbbbbyyyyrk", [EMPTY_BOARD, EMPTY_BOARD])
}

/// A single blue tile remains and blue is already on every wall row, so the
/// floor is the only destination.
pub fn single_move_position() -> AzulState {
    two_player(
        "-,-,-,-,-",
        "b",
        [
            "5/-,-,-,-,-/xoooo.oxooo.ooxoo.oooxo.oooox/-",
            EMPTY_BOARD,
        ],
    )
}

/// Distinct opening positions, one per seed.
pub fn opening_positions(count: u64) -> Vec<PositionInput> {
    (0..count).map(|seed| PositionInput::of(&new_game(seed))).collect()
}

pub fn fixed_engine(name: &str, category: EngineCategory, value: f64) -> EngineAdapter {
    EngineAdapter::new(
        name,
        category,
        Arc::new(move |_: &EvaluationInput| -> Result<EngineValue, EngineFault> {
            Ok(EngineValue::new(value))
        }),
        Arc::new(AzulRules),
    )
}

/// Analysis of `state` by the pattern engine alone.
pub fn pattern_analysis(state: &AzulState) -> PositionAnalysis {
    let rules: Arc<dyn Rules> = Arc::new(AzulRules);
    let engines = EngineSet::new().with(EngineAdapter::new(
        "pattern",
        EngineCategory::Pattern,
        Arc::new(PatternEngine),
        Arc::clone(&rules),
    ));
    let coordinator = MoveCoordinator::new(1).unwrap();
    PositionAnalyzer::new(rules, coordinator)
        .analyze(
            state,
            GamePhase::classify(state),
            &engines,
            &AnalysisSettings::default(),
        )
        .unwrap()
}
