use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::azul_move::{AzulMove, EnumeratorConfig, MoveEnumerator, Source, Take};
use crate::game::{AzulRules, AzulState, Rules, RulesError, TileColor};
use crate::test_support::{fifty_move_position, new_game, single_move_position};

use super::pattern::PatternEngine;
use super::*;

const BUDGET: Duration = Duration::from_millis(500);

/// Rules whose successor computation always fails.
struct RejectingRules;

impl Rules for RejectingRules {
    fn legal_moves(&self, state: &AzulState, player: usize) -> Vec<Take> {
        AzulRules.legal_moves(state, player)
    }

    fn apply(&self, _state: &AzulState, _azul_move: &AzulMove) -> Result<AzulState, RulesError> {
        Err(RulesError::GameOver)
    }

    fn validate(&self, state: &AzulState) -> Result<(), RulesError> {
        AzulRules.validate(state)
    }

    fn is_terminal(&self, state: &AzulState) -> bool {
        AzulRules.is_terminal(state)
    }
}

/// Rules that blow up while computing the successor.
struct PanickingRules;

impl Rules for PanickingRules {
    fn legal_moves(&self, state: &AzulState, player: usize) -> Vec<Take> {
        AzulRules.legal_moves(state, player)
    }

    fn apply(&self, _state: &AzulState, _azul_move: &AzulMove) -> Result<AzulState, RulesError> {
        panic!("wall layout corrupted")
    }

    fn validate(&self, state: &AzulState) -> Result<(), RulesError> {
        AzulRules.validate(state)
    }

    fn is_terminal(&self, state: &AzulState) -> bool {
        AzulRules.is_terminal(state)
    }
}

struct WideRange;

impl Evaluator for WideRange {
    fn evaluate(&self, _input: &EvaluationInput) -> Result<EngineValue, EngineFault> {
        Ok(EngineValue::new(5.0))
    }

    fn value_range(&self) -> (f64, f64) {
        (-10.0, 10.0)
    }
}

fn adapter_for<E: Evaluator + 'static>(evaluator: E) -> EngineAdapter {
    EngineAdapter::new(
        "test",
        EngineCategory::Pattern,
        Arc::new(evaluator),
        Arc::new(AzulRules),
    )
}

fn engine_fn<F>(evaluate: F) -> EngineAdapter
where
    F: Fn(&EvaluationInput) -> Result<EngineValue, EngineFault> + Send + Sync + 'static,
{
    adapter_for(evaluate)
}

fn single_move() -> AzulMove {
    AzulMove::ToFloor {
        source: Source::Center,
        color: TileColor::Blue,
        count: 1,
    }
}

fn first_move(state: &AzulState) -> AzulMove {
    MoveEnumerator::new(&AzulRules, EnumeratorConfig::default()).enumerate(state)[0]
}

#[test]
fn test_successful_evaluation_is_normalized() {
    let adapter = adapter_for(WideRange);
    let score = adapter.evaluate(&single_move_position(), &single_move(), BUDGET);
    match score {
        EngineScore::Success { value, raw, .. } => {
            assert_eq!(75.0, value);
            assert_eq!(5.0, raw);
        }
        failure => panic!("expected success, got {:?}", failure),
    }
}

#[test]
fn test_out_of_range_values_are_clamped() {
    let high = engine_fn(|_| Ok(EngineValue::new(250.0)));
    let low = engine_fn(|_| Ok(EngineValue::new(-3.0)));
    let state = single_move_position();
    assert_eq!(Some(100.0), high.evaluate(&state, &single_move(), BUDGET).value());
    assert_eq!(Some(0.0), low.evaluate(&state, &single_move(), BUDGET).value());
}

#[test]
fn test_non_finite_value_is_an_engine_error() {
    let adapter = engine_fn(|_| Ok(EngineValue::new(f64::NAN)));
    let score = adapter.evaluate(&single_move_position(), &single_move(), BUDGET);
    assert!(matches!(
        score,
        EngineScore::Failure {
            reason: FailureKind::EngineError(_)
        }
    ));
}

#[test]
fn test_slow_engine_times_out_within_budget() {
    let adapter = engine_fn(|_| {
        thread::sleep(Duration::from_millis(400));
        Ok(EngineValue::new(50.0))
    });
    let started = Instant::now();
    let score = adapter.evaluate(&single_move_position(), &single_move(), Duration::from_millis(20));
    assert_eq!(EngineScore::failure(FailureKind::Timeout), score);
    assert!(started.elapsed() < Duration::from_millis(300));
}

#[test]
fn test_engine_reporting_out_of_time_is_a_timeout() {
    let adapter = engine_fn(|_| Err(EngineFault::OutOfTime));
    let score = adapter.evaluate(&single_move_position(), &single_move(), BUDGET);
    assert_eq!(EngineScore::failure(FailureKind::Timeout), score);
}

#[test]
fn test_engine_fault_is_reported() {
    let adapter = engine_fn(|_| Err(EngineFault::Message("boom".to_string())));
    let score = adapter.evaluate(&single_move_position(), &single_move(), BUDGET);
    assert_eq!(
        EngineScore::failure(FailureKind::EngineError("boom".to_string())),
        score
    );
}

#[test]
fn test_panicking_engine_is_contained() {
    let adapter = engine_fn(|_| {
        panic!("engine crashed")
    });
    let score = adapter.evaluate(&single_move_position(), &single_move(), BUDGET);
    assert!(matches!(
        score,
        EngineScore::Failure {
            reason: FailureKind::EngineError(_)
        }
    ));
}

#[test]
fn test_rejected_move_is_an_invalid_simulation() {
    let adapter = EngineAdapter::new(
        "pattern",
        EngineCategory::Pattern,
        Arc::new(PatternEngine),
        Arc::new(RejectingRules),
    );
    let score = adapter.evaluate(&single_move_position(), &single_move(), BUDGET);
    assert!(matches!(
        score,
        EngineScore::Failure {
            reason: FailureKind::InvalidMoveSimulation(_)
        }
    ));
}

#[test]
fn test_metrics_count_each_outcome() {
    let adapter = engine_fn(|input| {
        if input.azul_move.is_floor() {
            Err(EngineFault::OutOfTime)
        } else {
            Ok(EngineValue::new(60.0))
        }
    });
    let state = fifty_move_position();
    let moves = MoveEnumerator::new(&AzulRules, EnumeratorConfig::default()).enumerate(&state);
    for azul_move in &moves {
        adapter.evaluate(&state, azul_move, BUDGET);
    }
    let floor_moves = moves.iter().filter(|m| m.is_floor()).count() as u64;
    let tally = adapter.metrics().snapshot();
    assert_eq!(50, adapter.metrics().calls());
    assert_eq!(floor_moves, tally.timeouts);
    assert_eq!(50 - floor_moves, tally.succeeded);
    assert_eq!(50, tally.total());
}

#[test]
fn test_pattern_engine_rates_forced_floor_move_poorly() {
    let adapter = adapter_for(PatternEngine);
    let score = adapter.evaluate(&single_move_position(), &single_move(), BUDGET);
    assert_eq!(Some(22.0), score.value());
}

#[test]
fn test_pattern_engine_prefers_completing_a_line() {
    let state = fifty_move_position();
    let adapter = adapter_for(PatternEngine);
    let complete = AzulMove::ToPatternLine {
        source: Source::Center,
        color: TileColor::Blue,
        count: 5,
        line: 4,
    };
    let dump = AzulMove::ToFloor {
        source: Source::Center,
        color: TileColor::Blue,
        count: 5,
    };
    let complete_score = adapter.evaluate(&state, &complete, BUDGET).value().unwrap();
    let dump_score = adapter.evaluate(&state, &dump, BUDGET).value().unwrap();
    assert!(complete_score > dump_score);
}

#[test]
fn test_every_builtin_engine_scores_an_opening_move() {
    let state = new_game(5);
    let azul_move = first_move(&state);
    let rules: Arc<dyn Rules> = Arc::new(AzulRules);
    let settings = BuiltinSettings {
        search_depth: 1,
        rollouts: 4,
        ..BuiltinSettings::default()
    };
    let engines = EngineSet::builtin(
        &settings,
        &BuiltinEngine::ALL,
        Duration::from_secs(5),
        rules,
    );
    assert_eq!(6, engines.len());
    for adapter in engines.enabled() {
        let score = adapter.evaluate(&state, &azul_move, adapter.time_budget());
        let value = score
            .value()
            .unwrap_or_else(|| panic!("{} failed: {:?}", adapter.name(), score));
        assert!((0.0..=100.0).contains(&value), "{} gave {}", adapter.name(), value);
    }
}

#[test]
fn test_simulation_engine_is_deterministic_for_a_seed() {
    let state = new_game(9);
    let azul_move = first_move(&state);
    let rules: Arc<dyn Rules> = Arc::new(AzulRules);
    let first = adapter_for(simulation::SimulationEngine::new(Arc::clone(&rules), 6, 42));
    let second = adapter_for(simulation::SimulationEngine::new(rules, 6, 42));
    assert_eq!(
        first.evaluate(&state, &azul_move, Duration::from_secs(5)),
        second.evaluate(&state, &azul_move, Duration::from_secs(5))
    );
}

#[test]
fn test_builtin_set_keeps_disabled_engines() {
    let engines = EngineSet::builtin(
        &BuiltinSettings::default(),
        &[BuiltinEngine::Pattern, BuiltinEngine::Risk],
        BUDGET,
        Arc::new(AzulRules),
    );
    assert_eq!(6, engines.len());
    assert_eq!(2, engines.enabled().len());
    assert!(!engines.get("search").unwrap().is_enabled());
    assert_eq!(
        EngineCategory::BoardImpact,
        engines.get("simulation").unwrap().category()
    );
}

#[test]
fn test_builtin_engine_parsing() {
    assert_eq!(Ok(BuiltinEngine::Denial), "denial".parse::<BuiltinEngine>());
    assert!("stockfish".parse::<BuiltinEngine>().is_err());
    assert_eq!(
        Ok(EngineCategory::BoardImpact),
        "board_impact".parse::<EngineCategory>()
    );
}

#[test]
fn test_panicking_rules_are_an_invalid_simulation() {
    let adapter = EngineAdapter::new(
        "pattern",
        EngineCategory::Pattern,
        Arc::new(PatternEngine),
        Arc::new(PanickingRules),
    );
    let score = adapter.evaluate(&single_move_position(), &single_move(), BUDGET);
    match score {
        EngineScore::Failure {
            reason: FailureKind::InvalidMoveSimulation(message),
        } => assert!(message.contains("wall layout corrupted"), "{}", message),
        other => panic!("unexpected score {:?}", other),
    }
    assert_eq!(1, adapter.metrics().snapshot().invalid_simulations);
}
