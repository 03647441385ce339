use std::str::FromStr;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use uuid::Uuid;

use crate::analysis::{ConfigError, PositionAnalysis, QualityTier};
use crate::engine::{
    BuiltinEngine, BuiltinSettings, EngineAdapter, EngineCategory, EngineFault, EngineSet,
    EngineValue, EvaluationInput,
};
use crate::game::{AzulRules, GamePhase};
use crate::store::{MemoryStore, MoveRecord, ResultStore, StoreError, StoredPosition};
use crate::test_support::{fifty_move_position, new_game, opening_positions};

use super::*;

fn manager() -> Arc<SessionManager> {
    Arc::new(SessionManager::new(
        Arc::new(MemoryStore::new()),
        Arc::new(AzulRules),
    ))
}

fn quick() -> AnalysisConfig {
    AnalysisConfig {
        worker_count: 2,
        ..AnalysisConfig::for_profile(AnalysisProfile::Quick)
    }
}

/// Yields the wrapped positions and asks the manager to stop the session
/// while handing out position `stop_at`.
struct StoppingSource {
    inner: std::vec::IntoIter<PositionInput>,
    manager: Weak<SessionManager>,
    id: Uuid,
    stop_at: usize,
    yielded: usize,
}

impl Iterator for StoppingSource {
    type Item = PositionInput;

    fn next(&mut self) -> Option<PositionInput> {
        if self.yielded == self.stop_at {
            if let Some(manager) = self.manager.upgrade() {
                manager.stop(self.id).unwrap();
            }
        }
        self.yielded += 1;
        self.inner.next()
    }
}

fn stopping_source(
    manager: &Arc<SessionManager>,
    id: Uuid,
    positions: Vec<PositionInput>,
    stop_at: usize,
) -> PositionSource {
    Box::new(StoppingSource {
        inner: positions.into_iter(),
        manager: Arc::downgrade(manager),
        id,
        stop_at,
        yielded: 0,
    })
}

struct ChannelSource(Receiver<PositionInput>);

impl Iterator for ChannelSource {
    type Item = PositionInput;

    fn next(&mut self) -> Option<PositionInput> {
        self.0.recv().ok()
    }
}

/// Accepts sessions but refuses every position.
struct FailingStore(MemoryStore);

impl ResultStore for FailingStore {
    fn save_session(&self, session: &AnalysisSession) -> Result<(), StoreError> {
        self.0.save_session(session)
    }

    fn load_session(&self, id: Uuid) -> Result<AnalysisSession, StoreError> {
        self.0.load_session(id)
    }

    fn list_sessions(&self) -> Result<Vec<AnalysisSession>, StoreError> {
        self.0.list_sessions()
    }

    fn delete_session(&self, id: Uuid) -> Result<(), StoreError> {
        self.0.delete_session(id)
    }

    fn save_position(
        &self,
        _session_id: Uuid,
        _sequence: u64,
        _analysis: &PositionAnalysis,
    ) -> Result<(), StoreError> {
        Err(StoreError::Io {
            path: "positions.jsonl".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        })
    }

    fn positions_for_session(&self, id: Uuid) -> Result<Vec<StoredPosition>, StoreError> {
        self.0.positions_for_session(id)
    }

    fn positions_by_id(&self, position_id: &str) -> Result<Vec<StoredPosition>, StoreError> {
        self.0.positions_by_id(position_id)
    }

    fn top_moves(&self, session: Option<Uuid>, limit: usize) -> Result<Vec<MoveRecord>, StoreError> {
        self.0.top_moves(session, limit)
    }
}

#[test]
fn test_status_transitions() {
    use SessionStatus::*;
    assert!(Created.can_transition_to(Running));
    assert!(Running.can_transition_to(Stopped));
    assert!(Stopped.can_transition_to(Running));
    assert!(Failed.can_transition_to(Running));
    assert!(!Completed.can_transition_to(Running));
    assert!(!Created.can_transition_to(Completed));
    assert!(!Running.can_transition_to(Created));

    let mut session = AnalysisSession::new(Uuid::new_v4(), quick(), 1);
    assert!(matches!(
        session.transition(Completed),
        Err(SessionError::InvalidTransition {
            from: Created,
            to: Completed
        })
    ));
    session.transition(Running).unwrap();
    assert!(session.started_at.is_some());
    session.transition(Completed).unwrap();
    assert!(session.finished_at.is_some());
}

#[test]
fn test_profiles() {
    assert_eq!(
        AnalysisProfile::Deep,
        AnalysisProfile::from_str("deep").unwrap()
    );
    assert!(matches!(
        AnalysisProfile::from_str("instant"),
        Err(ConfigError::UnknownProfile(_))
    ));
    assert_eq!(AnalysisProfile::Standard, AnalysisProfile::default());

    let quick = AnalysisProfile::Quick.preset();
    let exhaustive = AnalysisProfile::Exhaustive.preset();
    assert!(quick.engines.len() < exhaustive.engines.len());
    assert_eq!(BuiltinEngine::ALL.len(), exhaustive.engines.len());
    assert_eq!(Some(20), quick.enumerator().max_moves);
    assert_eq!(None, exhaustive.enumerator().max_moves);
    assert!(!exhaustive.enumerator().filter_dominated);
}

#[test]
fn test_config_from_json() {
    let config = AnalysisConfig::from_json(
        r#"{
            "profile": "quick",
            "worker_count": 2,
            "cache_capacity": 0,
            "engines": { "search": { "enabled": true, "time_budget_ms": 50 } }
        }"#,
    )
    .unwrap();
    config.validate().unwrap();
    assert_eq!(AnalysisProfile::Quick, config.profile);
    assert_eq!(2, config.worker_count);
    assert!(config.score_cache().is_none());

    let engines = config.engine_set(Arc::new(AzulRules));
    assert_eq!(BuiltinEngine::ALL.len(), engines.len());
    let search = engines.get("search").unwrap();
    assert!(search.is_enabled());
    assert_eq!(Duration::from_millis(50), search.time_budget());
    let simulation = engines.get("simulation").unwrap();
    assert!(!simulation.is_enabled());
    assert_eq!(Duration::from_millis(100), simulation.time_budget());
    assert!(engines.get("pattern").unwrap().is_enabled());
}

#[test]
fn test_config_rejects_bad_values() {
    let unknown = AnalysisConfig::from_json(r#"{ "engines": { "oracle": {} } }"#).unwrap();
    assert!(matches!(
        unknown.validate(),
        Err(ConfigError::UnknownEngine(name)) if name == "oracle"
    ));
    assert!(matches!(
        AnalysisConfig::from_json(r#"{ "profile": "instant" }"#),
        Err(ConfigError::Parse(_))
    ));
    let no_workers = AnalysisConfig {
        worker_count: 0,
        ..quick()
    };
    assert!(matches!(
        no_workers.validate(),
        Err(ConfigError::InvalidWorkerCount)
    ));
}

#[test]
fn test_random_positions_are_reproducible() {
    let first: Vec<PositionInput> = RandomPositions::new(7, 2, 30).take(4).collect();
    let second: Vec<PositionInput> = RandomPositions::new(7, 2, 30).take(4).collect();
    assert_eq!(first, second);
    for input in &first {
        let state: crate::game::AzulState = input.encoding.parse().unwrap();
        assert!(!state.game_over);
    }
}

#[test]
fn test_file_positions_parse() {
    let opening = new_game(3).to_string();
    let contents = format!(
        "# positions\n\n{}\n{}\tendgame\n{}\tsideways\n",
        opening, opening, opening
    );
    let inputs = FilePositions::parse(&contents);
    assert_eq!(3, inputs.len());
    assert_eq!(PositionInput::new(&opening), inputs[0]);
    assert_eq!(Some(GamePhase::Endgame), inputs[1].phase);
    assert_eq!(Some(GamePhase::Unknown), inputs[2].phase);
}

#[test]
fn test_session_completes_target() {
    let manager = manager();
    let progress = manager
        .start(SessionRequest::new(
            quick(),
            Box::new(opening_positions(5).into_iter()),
            3,
        ))
        .unwrap();
    let id = progress.id;

    let session = manager.wait(id).unwrap();
    assert_eq!(SessionStatus::Completed, session.status);
    assert_eq!(3, session.positions_analyzed);
    assert_eq!(0, session.positions_failed);
    assert_eq!(0, session.in_progress);
    assert!(session.moves_assessed > 0);
    assert_eq!(
        session.moves_assessed,
        session.tier_totals.values().sum::<u64>()
    );

    let results = manager.results(id).unwrap();
    let sequences: Vec<u64> = results.iter().map(|p| p.sequence).collect();
    assert_eq!(vec![0, 1, 2], sequences);
    let expected: Vec<String> = opening_positions(3)
        .into_iter()
        .map(|input| input.encoding)
        .collect();
    let analyzed: Vec<String> = results
        .iter()
        .map(|p| p.analysis.position_id.clone())
        .collect();
    assert_eq!(expected, analyzed);

    let progress = manager.progress(id).unwrap();
    assert_eq!(SessionStatus::Completed, progress.status);
    assert_eq!(100.0, progress.percent_complete);
    assert_eq!(1.0, progress.success_rate);
}

#[test]
fn test_session_completes_when_source_runs_dry() {
    let manager = manager();
    let id = manager
        .start(SessionRequest::new(
            quick(),
            Box::new(opening_positions(2).into_iter()),
            10,
        ))
        .unwrap()
        .id;
    let session = manager.wait(id).unwrap();
    assert_eq!(SessionStatus::Completed, session.status);
    assert_eq!(2, session.positions_analyzed);
}

#[test]
fn test_stop_keeps_only_positions_taken() {
    let manager = manager();
    let id = Uuid::new_v4();
    let source = stopping_source(&manager, id, opening_positions(6), 2);
    manager
        .start(SessionRequest::new(quick(), source, 6).with_id(id))
        .unwrap();

    let session = manager.wait(id).unwrap();
    assert_eq!(SessionStatus::Stopped, session.status);
    // the position in hand when the stop arrived is still analyzed
    assert_eq!(3, session.positions_analyzed);
    assert_eq!(3, manager.results(id).unwrap().len());
    assert!(matches!(
        manager.stop(id),
        Err(SessionError::InvalidTransition {
            from: SessionStatus::Stopped,
            ..
        })
    ));
}

#[test]
fn test_resume_continues_where_stopped() {
    let manager = manager();
    let id = Uuid::new_v4();
    let source = stopping_source(&manager, id, opening_positions(4), 1);
    manager
        .start(SessionRequest::new(quick(), source, 4).with_id(id))
        .unwrap();
    assert_eq!(2, manager.wait(id).unwrap().positions_analyzed);

    manager
        .resume(id, Some(Box::new(opening_positions(4).into_iter())))
        .unwrap();
    let session = manager.wait(id).unwrap();
    assert_eq!(SessionStatus::Completed, session.status);
    assert_eq!(4, session.positions_analyzed);

    let analyzed: Vec<String> = manager
        .results(id)
        .unwrap()
        .into_iter()
        .map(|p| p.analysis.position_id)
        .collect();
    let expected: Vec<String> = opening_positions(4)
        .into_iter()
        .map(|input| input.encoding)
        .collect();
    assert_eq!(expected, analyzed);

    assert!(matches!(
        manager.resume(id, Some(Box::new(opening_positions(4).into_iter()))),
        Err(SessionError::InvalidTransition {
            from: SessionStatus::Completed,
            to: SessionStatus::Running
        })
    ));
}

#[test]
fn test_resume_recovers_interrupted_session() {
    let store: Arc<dyn ResultStore> = Arc::new(MemoryStore::new());
    let spec = SourceSpec::Random {
        seed: 11,
        player_count: 2,
        max_plies: 10,
    };
    let mut crashed = AnalysisSession::new(Uuid::new_v4(), quick(), 2);
    crashed.source = Some(spec);
    crashed.transition(SessionStatus::Running).unwrap();
    store.save_session(&crashed).unwrap();

    let manager = SessionManager::new(Arc::clone(&store), Arc::new(AzulRules));
    manager.resume(crashed.id, None).unwrap();
    let session = manager.wait(crashed.id).unwrap();
    assert_eq!(SessionStatus::Completed, session.status);
    assert_eq!(2, session.positions_analyzed);
}

#[test]
fn test_malformed_position_does_not_stop_session() {
    let manager = manager();
    let mut positions = opening_positions(3);
    positions[1] = PositionInput::new("not a position");
    let id = manager
        .start(SessionRequest::new(quick(), Box::new(positions.into_iter()), 3))
        .unwrap()
        .id;

    let session = manager.wait(id).unwrap();
    assert_eq!(SessionStatus::Completed, session.status);
    assert_eq!(2, session.positions_analyzed);
    assert_eq!(1, session.positions_failed);
    let sequences: Vec<u64> = manager
        .results(id)
        .unwrap()
        .iter()
        .map(|p| p.sequence)
        .collect();
    assert_eq!(vec![0, 2], sequences);
}

#[test]
fn test_store_failure_fails_session() {
    let manager = SessionManager::new(
        Arc::new(FailingStore(MemoryStore::new())),
        Arc::new(AzulRules),
    );
    let id = manager
        .start(SessionRequest::new(
            quick(),
            Box::new(opening_positions(2).into_iter()),
            2,
        ))
        .unwrap()
        .id;

    let session = manager.wait(id).unwrap();
    assert_eq!(SessionStatus::Failed, session.status);
    assert_eq!(0, session.positions_analyzed);
    let reason = session.failure_reason.unwrap();
    assert!(reason.contains("disk full"), "{}", reason);
    assert_eq!(
        SessionStatus::Failed,
        manager.store().load_session(id).unwrap().status
    );
}

#[test]
fn test_slow_engine_times_out_on_every_move() {
    let rules = Arc::new(AzulRules);
    let settings = BuiltinSettings {
        search_depth: 1,
        rollouts: 2,
        ..BuiltinSettings::default()
    };
    let fast: Vec<BuiltinEngine> = BuiltinEngine::ALL
        .iter()
        .copied()
        .filter(|&engine| engine != BuiltinEngine::Denial)
        .collect();
    let mut engines = EngineSet::builtin(&settings, &fast, Duration::from_secs(10), rules.clone());
    engines.push(
        EngineAdapter::new(
            "slow",
            EngineCategory::OpponentDenial,
            Arc::new(|_: &EvaluationInput| -> Result<EngineValue, EngineFault> {
                thread::sleep(Duration::from_millis(200));
                Ok(EngineValue::new(100.0))
            }),
            rules,
        )
        .with_time_budget(Duration::from_millis(10)),
    );

    let manager = manager();
    let id = manager
        .start(
            SessionRequest::new(
                AnalysisConfig::for_profile(AnalysisProfile::Exhaustive),
                Box::new(vec![PositionInput::of(&fifty_move_position())].into_iter()),
                1,
            )
            .with_engines(engines),
        )
        .unwrap()
        .id;

    let session = manager.wait(id).unwrap();
    assert_eq!(SessionStatus::Completed, session.status);
    assert_eq!(50, session.moves_assessed);
    let slow = session.engine_tallies["slow"];
    assert_eq!(50, slow.timeouts);
    assert_eq!(0, slow.succeeded);
    for engine in &fast {
        let tally = session.engine_tallies[engine.name()];
        assert_eq!(50, tally.succeeded, "{}", engine);
        assert_eq!(0, tally.timeouts, "{}", engine);
    }
    assert!(!session.engine_tallies.contains_key("denial"));
}

#[test]
fn test_duplicate_and_invalid_requests() {
    let manager = manager();
    let id = Uuid::new_v4();
    manager
        .start(
            SessionRequest::new(quick(), Box::new(opening_positions(1).into_iter()), 1)
                .with_id(id),
        )
        .unwrap();
    manager.wait(id).unwrap();
    assert!(matches!(
        manager.start(
            SessionRequest::new(quick(), Box::new(opening_positions(1).into_iter()), 1)
                .with_id(id)
        ),
        Err(SessionError::AlreadyExists(existing)) if existing == id
    ));
    assert!(matches!(
        manager.start(
            SessionRequest::new(quick(), Box::new(opening_positions(1).into_iter()), 1)
                .with_workers(0)
        ),
        Err(SessionError::Config(ConfigError::InvalidWorkerCount))
    ));
    assert_eq!(1, manager.list().unwrap().len());
    let missing = Uuid::new_v4();
    assert!(matches!(
        manager.progress(missing),
        Err(SessionError::NotFound(id)) if id == missing
    ));
}

#[test]
fn test_delete_refused_while_running() {
    let manager = manager();
    let (sender, receiver) = mpsc::channel();
    let id = manager
        .start(SessionRequest::new(quick(), Box::new(ChannelSource(receiver)), 5))
        .unwrap()
        .id;

    assert!(matches!(
        manager.delete(id),
        Err(SessionError::StillRunning(running)) if running == id
    ));
    assert!(matches!(
        manager.resume(id, None),
        Err(SessionError::StillRunning(_))
    ));
    sender.send(PositionInput::of(&new_game(0))).unwrap();
    drop(sender);

    let session = manager.wait(id).unwrap();
    assert_eq!(SessionStatus::Completed, session.status);
    assert_eq!(1, session.positions_analyzed);
    manager.delete(id).unwrap();
    assert!(manager.list().unwrap().is_empty());
    assert!(manager.results(id).is_err());
}

#[test]
fn test_summary() {
    let manager = manager();
    let id = manager
        .start(SessionRequest::new(
            quick(),
            Box::new(opening_positions(2).into_iter()),
            2,
        ))
        .unwrap()
        .id;
    manager.wait(id).unwrap();

    let summary = manager.summary(id).unwrap();
    assert_eq!(1.0, summary.success_rate);
    assert!(summary.mean_quality.is_some());
    assert_eq!(5, summary.best_moves.len());
    assert!(summary
        .best_moves
        .windows(2)
        .all(|pair| pair[0].assessment.quality_score >= pair[1].assessment.quality_score));
    assert_eq!(QualityTier::ALL.len(), summary.tier_distribution.len());
    assert_eq!(
        summary.session.moves_assessed,
        summary.tier_distribution.values().sum::<u64>()
    );

    let overall = manager.top_moves(None, 1).unwrap();
    assert_eq!(summary.best_moves[0].assessment.quality_score, overall[0].assessment.quality_score);
}

#[test]
fn test_session_records_round_trip_through_json() {
    let mut session = AnalysisSession::new(Uuid::new_v4(), quick(), 3);
    session.source = Some(SourceSpec::File {
        path: "positions.txt".into(),
    });
    let json = serde_json::to_string(&session).unwrap();
    let loaded: AnalysisSession = serde_json::from_str(&json).unwrap();
    assert_eq!(session, loaded);
    assert!(json.contains(r#""kind":"file""#));
}
