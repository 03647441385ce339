use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use uuid::Uuid;

use crate::analysis::{PositionAnalysis, PositionStatistics};
use crate::session::{AnalysisConfig, AnalysisSession, SessionStatus};
use crate::test_support::{fifty_move_position, new_game, pattern_analysis, single_move_position};

use super::*;

struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("azul-store-{}", Uuid::new_v4()));
        Self(path)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn session(target_count: u64) -> AnalysisSession {
    AnalysisSession::new(Uuid::new_v4(), AnalysisConfig::default(), target_count)
}

/// Saves a session with three analyzed positions and returns it.
fn populate(store: &dyn ResultStore) -> AnalysisSession {
    let session = session(3);
    store.save_session(&session).unwrap();
    let states = [fifty_move_position(), new_game(1), single_move_position()];
    for (sequence, state) in states.iter().enumerate() {
        store
            .save_position(session.id, sequence as u64, &pattern_analysis(state))
            .unwrap();
    }
    session
}

fn check_queries(store: &dyn ResultStore, session: &AnalysisSession) {
    let positions = store.positions_for_session(session.id).unwrap();
    assert_eq!(3, positions.len());
    let sequences: Vec<u64> = positions.iter().map(|p| p.sequence).collect();
    assert_eq!(vec![0, 1, 2], sequences);
    assert_eq!(pattern_analysis(&fifty_move_position()).assessments, positions[0].analysis.assessments);

    let position_id = single_move_position().to_string();
    let found = store.positions_by_id(&position_id).unwrap();
    assert_eq!(1, found.len());
    assert_eq!(session.id, found[0].session_id);
    assert_eq!(1, found[0].analysis.assessments.len());

    let top = store.top_moves(Some(session.id), 5).unwrap();
    assert_eq!(5, top.len());
    assert!(top
        .windows(2)
        .all(|pair| pair[0].assessment.quality_score >= pair[1].assessment.quality_score));
    let best_overall = positions
        .iter()
        .flat_map(|p| p.analysis.assessments.iter())
        .map(|a| a.quality_score)
        .fold(f64::MIN, f64::max);
    assert_eq!(best_overall, top[0].assessment.quality_score);
}

#[test]
fn test_memory_store_sessions() {
    let store = MemoryStore::new();
    let mut session = session(10);
    store.save_session(&session).unwrap();
    session.transition(SessionStatus::Running).unwrap();
    store.save_session(&session).unwrap();

    assert_eq!(session, store.load_session(session.id).unwrap());
    assert_eq!(1, store.list_sessions().unwrap().len());
    let missing = Uuid::new_v4();
    assert!(matches!(
        store.load_session(missing),
        Err(StoreError::SessionNotFound(id)) if id == missing
    ));
}

#[test]
fn test_memory_store_queries() {
    let store = MemoryStore::new();
    let session = populate(&store);
    check_queries(&store, &session);
}

#[test]
fn test_top_moves_across_sessions() {
    let store = MemoryStore::new();
    let first = populate(&store);
    let second = populate(&store);
    let all = store.top_moves(None, 1_000).unwrap();
    let per_session = store.top_moves(Some(first.id), 1_000).unwrap();
    assert_eq!(2 * per_session.len(), all.len());
    assert!(all.iter().any(|record| record.session_id == second.id));
    assert_eq!(2, store.positions_by_id(&new_game(1).to_string()).unwrap().len());
}

#[test]
fn test_delete_removes_everything() {
    let store = MemoryStore::new();
    let doomed = populate(&store);
    let kept = populate(&store);
    store.delete_session(doomed.id).unwrap();

    assert!(store.load_session(doomed.id).is_err());
    assert!(store.positions_for_session(doomed.id).unwrap().is_empty());
    assert!(store
        .top_moves(None, 1_000)
        .unwrap()
        .iter()
        .all(|record| record.session_id == kept.id));
    assert_eq!(1, store.positions_by_id(&new_game(1).to_string()).unwrap().len());
    assert!(matches!(
        store.delete_session(doomed.id),
        Err(StoreError::SessionNotFound(_))
    ));
}

#[test]
fn test_jsonl_store_survives_reopen() {
    let dir = TempDir::new();
    let session = {
        let store = JsonlStore::open(&dir.0).unwrap();
        let session = populate(&store);
        check_queries(&store, &session);
        session
    };

    let reopened = JsonlStore::open(&dir.0).unwrap();
    assert_eq!(session, reopened.load_session(session.id).unwrap());
    check_queries(&reopened, &session);
}

#[test]
fn test_jsonl_last_session_record_wins() {
    let dir = TempDir::new();
    let mut session = session(2);
    {
        let store = JsonlStore::open(&dir.0).unwrap();
        store.save_session(&session).unwrap();
        session.transition(SessionStatus::Running).unwrap();
        session.positions_analyzed = 1;
        store.save_session(&session).unwrap();
    }
    let reopened = JsonlStore::open(&dir.0).unwrap();
    let loaded = reopened.load_session(session.id).unwrap();
    assert_eq!(SessionStatus::Running, loaded.status);
    assert_eq!(1, loaded.positions_analyzed);
    assert_eq!(1, reopened.list_sessions().unwrap().len());
}

#[test]
fn test_jsonl_ignores_uncommitted_moves_and_torn_lines() {
    let dir = TempDir::new();
    let session = {
        let store = JsonlStore::open(&dir.0).unwrap();
        populate(&store)
    };

    // moves of a fourth position whose position line never made it
    let (_, orphans) = records::split(session.id, 3, &pattern_analysis(&new_game(9)));
    let mut moves = OpenOptions::new()
        .append(true)
        .open(dir.0.join("moves.jsonl"))
        .unwrap();
    for record in &orphans {
        writeln!(moves, "{}", serde_json::to_string(record).unwrap()).unwrap();
    }
    let mut positions = OpenOptions::new()
        .append(true)
        .open(dir.0.join("positions.jsonl"))
        .unwrap();
    write!(positions, "{{\"session_id\":\"{}\",\"seq", session.id).unwrap();

    let reopened = JsonlStore::open(&dir.0).unwrap();
    assert_eq!(3, reopened.positions_for_session(session.id).unwrap().len());
    check_queries(&reopened, &session);
}

fn append_raw(path: PathBuf, text: &str) {
    let mut file = OpenOptions::new().create(true).append(true).open(path).unwrap();
    write!(file, "{}", text).unwrap();
}

fn append_moves(dir: &TempDir, records: &[MoveRecord]) {
    for record in records {
        append_raw(
            dir.0.join("moves.jsonl"),
            &format!("{}\n", serde_json::to_string(record).unwrap()),
        );
    }
}

#[test]
fn test_jsonl_appends_cleanly_after_torn_line() {
    let dir = TempDir::new();
    let session = {
        let store = JsonlStore::open(&dir.0).unwrap();
        populate(&store)
    };
    append_raw(
        dir.0.join("positions.jsonl"),
        &format!("{{\"session_id\":\"{}\",\"seq", session.id),
    );

    {
        let store = JsonlStore::open(&dir.0).unwrap();
        store
            .save_position(session.id, 3, &pattern_analysis(&new_game(5)))
            .unwrap();
        store
            .save_position(session.id, 4, &pattern_analysis(&new_game(6)))
            .unwrap();
    }

    let reopened = JsonlStore::open(&dir.0).unwrap();
    let sequences: Vec<u64> = reopened
        .positions_for_session(session.id)
        .unwrap()
        .iter()
        .map(|p| p.sequence)
        .collect();
    assert_eq!(vec![0, 1, 2, 3, 4], sequences);
    let positions = fs::read_to_string(dir.0.join("positions.jsonl")).unwrap();
    assert!(positions.ends_with('\n'));
    assert_eq!(5, positions.lines().count());
}

#[test]
fn test_jsonl_re_analysis_replaces_uncommitted_moves() {
    let dir = TempDir::new();
    let session = session(1);
    {
        let store = JsonlStore::open(&dir.0).unwrap();
        store.save_session(&session).unwrap();
    }
    // an earlier attempt at position 0 died before committing
    let (_, orphans) = records::split(session.id, 0, &pattern_analysis(&fifty_move_position()));
    append_moves(&dir, &orphans);

    {
        let store = JsonlStore::open(&dir.0).unwrap();
        store
            .save_position(session.id, 0, &pattern_analysis(&single_move_position()))
            .unwrap();
    }

    let reopened = JsonlStore::open(&dir.0).unwrap();
    let positions = reopened.positions_for_session(session.id).unwrap();
    assert_eq!(1, positions.len());
    let analysis = &positions[0].analysis;
    assert_eq!(1, analysis.assessments.len());
    assert_eq!(analysis.statistics.move_count, analysis.assessments.len());
    assert_eq!(
        analysis.assessments.len(),
        analysis.statistics.tier_distribution.values().sum::<usize>()
    );
    assert_eq!(1, reopened.top_moves(Some(session.id), 100).unwrap().len());
}

#[test]
fn test_jsonl_moveless_position_drops_uncommitted_moves() {
    let dir = TempDir::new();
    let session = session(1);
    {
        let store = JsonlStore::open(&dir.0).unwrap();
        store.save_session(&session).unwrap();
    }
    let (_, orphans) = records::split(session.id, 0, &pattern_analysis(&fifty_move_position()));
    append_moves(&dir, &orphans);

    let empty = PositionAnalysis {
        assessments: Vec::new(),
        statistics: PositionStatistics::compute(&[]),
        ..pattern_analysis(&single_move_position())
    };
    {
        let store = JsonlStore::open(&dir.0).unwrap();
        store.save_position(session.id, 0, &empty).unwrap();
    }

    let reopened = JsonlStore::open(&dir.0).unwrap();
    let positions = reopened.positions_for_session(session.id).unwrap();
    assert_eq!(1, positions.len());
    assert!(positions[0].analysis.assessments.is_empty());
    assert!(reopened.top_moves(None, 100).unwrap().is_empty());
}

#[test]
fn test_jsonl_rejects_corrupt_records() {
    let dir = TempDir::new();
    fs::create_dir_all(&dir.0).unwrap();
    fs::write(dir.0.join("sessions.jsonl"), "not json\n{}\n").unwrap();
    assert!(matches!(
        JsonlStore::open(&dir.0),
        Err(StoreError::Corrupt { line: 1, .. })
    ));
}

#[test]
fn test_jsonl_delete_rewrites_files() {
    let dir = TempDir::new();
    let (doomed, kept) = {
        let store = JsonlStore::open(&dir.0).unwrap();
        let doomed = populate(&store);
        let kept = populate(&store);
        store.delete_session(doomed.id).unwrap();
        (doomed, kept)
    };

    let reopened = JsonlStore::open(&dir.0).unwrap();
    assert!(reopened.load_session(doomed.id).is_err());
    assert!(reopened.positions_for_session(doomed.id).unwrap().is_empty());
    check_queries(&reopened, &kept);
    let moves = fs::read_to_string(dir.0.join("moves.jsonl")).unwrap();
    assert!(!moves.contains(&doomed.id.to_string()));
}
