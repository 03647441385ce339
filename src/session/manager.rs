//! Registry of sessions and the administrative operations over them.
//!
//! Each started session runs on its own thread. The manager keeps a handle
//! for every session it launched; finished sessions are read from the store.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use dashmap::DashMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{PositionAnalyzer, QualityTier};
use crate::engine::{EngineSet, EngineTally};
use crate::game::Rules;
use crate::store::{MoveRecord, ResultStore, StoredPosition};

use super::config::AnalysisConfig;
use super::error::SessionError;
use super::runner::{SessionHandle, SessionRunner};
use super::session::{AnalysisSession, SessionProgress, SessionStatus};
use super::source::{PositionSource, SourceSpec};

const SUMMARY_TOP_MOVES: usize = 5;

/// Everything needed to start a session.
pub struct SessionRequest {
    config: AnalysisConfig,
    source: PositionSource,
    source_spec: Option<SourceSpec>,
    target_count: u64,
    session_id: Option<Uuid>,
    worker_count: Option<usize>,
    engines: Option<EngineSet>,
}

impl SessionRequest {
    pub fn new(config: AnalysisConfig, source: PositionSource, target_count: u64) -> Self {
        Self {
            config,
            source,
            source_spec: None,
            target_count,
            session_id: None,
            worker_count: None,
            engines: None,
        }
    }

    /// A request whose source can be reopened when the session is resumed.
    pub fn from_spec(
        config: AnalysisConfig,
        spec: SourceSpec,
        target_count: u64,
    ) -> Result<Self, SessionError> {
        let source = spec.open()?;
        let mut request = Self::new(config, source, target_count);
        request.source_spec = Some(spec);
        Ok(request)
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.session_id = Some(id);
        self
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = Some(worker_count);
        self
    }

    /// Replaces the engines the profile would build.
    pub fn with_engines(mut self, engines: EngineSet) -> Self {
        self.engines = Some(engines);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session: AnalysisSession,
    pub mean_quality: Option<f64>,
    pub success_rate: f64,
    pub tier_distribution: BTreeMap<QualityTier, u64>,
    pub engine_tallies: BTreeMap<String, EngineTally>,
    pub best_moves: Vec<MoveRecord>,
}

struct LiveSession {
    handle: Arc<SessionHandle>,
    thread: Mutex<Option<JoinHandle<AnalysisSession>>>,
}

impl LiveSession {
    fn is_running(&self) -> bool {
        !self.handle.progress().status.is_finished()
    }

    fn join(&self) -> Option<thread::Result<AnalysisSession>> {
        let thread = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        Some(thread.join())
    }
}

pub struct SessionManager {
    store: Arc<dyn ResultStore>,
    rules: Arc<dyn Rules>,
    live: DashMap<Uuid, Arc<LiveSession>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn ResultStore>, rules: Arc<dyn Rules>) -> Self {
        Self {
            store,
            rules,
            live: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }

    /// Creates the session and starts it on its own thread.
    pub fn start(&self, request: SessionRequest) -> Result<SessionProgress, SessionError> {
        let SessionRequest {
            mut config,
            source,
            source_spec,
            target_count,
            session_id,
            worker_count,
            engines,
        } = request;
        if let Some(worker_count) = worker_count {
            config.worker_count = worker_count;
        }
        config.validate()?;

        let id = session_id.unwrap_or_else(Uuid::new_v4);
        if self.live.contains_key(&id) || self.store.load_session(id).is_ok() {
            return Err(SessionError::AlreadyExists(id));
        }

        let mut session = AnalysisSession::new(id, config, target_count);
        session.source = source_spec;
        self.store.save_session(&session)?;
        info!("Created session {}", id);
        self.launch(session, source, engines)
    }

    /// Continues a stopped or failed session, skipping the positions it
    /// already consumed. Without an explicit source the recorded one is
    /// reopened.
    pub fn resume(
        &self,
        id: Uuid,
        source: Option<PositionSource>,
    ) -> Result<SessionProgress, SessionError> {
        if let Some(live) = self.live_session(id) {
            if live.is_running() {
                return Err(SessionError::StillRunning(id));
            }
            let _ = live.join();
        }

        let mut session = self.store.load_session(id)?;
        if session.status == SessionStatus::Running {
            // recorded as running but no thread owns it: the process died
            warn!("Session {} was interrupted, recovering it", id);
            session.transition(SessionStatus::Stopped)?;
        }
        if !session.status.can_transition_to(SessionStatus::Running)
            || session.status == SessionStatus::Created
        {
            return Err(SessionError::InvalidTransition {
                from: session.status,
                to: SessionStatus::Running,
            });
        }
        let source = match source {
            Some(source) => source,
            None => session
                .source
                .as_ref()
                .ok_or_else(|| {
                    SessionError::Fatal(format!("session {} has no reopenable source", id))
                })?
                .open()?,
        };
        let consumed = session.positions_consumed() as usize;
        info!("Resuming session {} after {} positions", id, consumed);
        self.launch(session, Box::new(source.skip(consumed)), None)
    }

    pub fn progress(&self, id: Uuid) -> Result<SessionProgress, SessionError> {
        if let Some(live) = self.live_session(id) {
            return Ok(live.handle.progress().as_ref().clone().refreshed());
        }
        Ok(SessionProgress::of(&self.store.load_session(id)?))
    }

    /// Asks a running session to stop after its in-flight position.
    pub fn stop(&self, id: Uuid) -> Result<SessionProgress, SessionError> {
        let progress = self.progress(id)?;
        if progress.status.is_finished() {
            return Err(SessionError::InvalidTransition {
                from: progress.status,
                to: SessionStatus::Stopped,
            });
        }
        match self.live_session(id) {
            Some(live) => {
                info!("Stop requested for session {}", id);
                live.handle.request_stop();
                Ok(progress)
            }
            None => Err(SessionError::InvalidTransition {
                from: progress.status,
                to: SessionStatus::Stopped,
            }),
        }
    }

    /// Blocks until the session's thread finishes and returns the final record.
    pub fn wait(&self, id: Uuid) -> Result<AnalysisSession, SessionError> {
        if let Some(live) = self.live_session(id) {
            if let Some(joined) = live.join() {
                return joined.map_err(|_| {
                    SessionError::Fatal(format!("session {} thread panicked", id))
                });
            }
        }
        Ok(self.store.load_session(id)?)
    }

    pub fn results(&self, id: Uuid) -> Result<Vec<StoredPosition>, SessionError> {
        self.store.load_session(id)?;
        Ok(self.store.positions_for_session(id)?)
    }

    pub fn summary(&self, id: Uuid) -> Result<SessionSummary, SessionError> {
        let session = self.store.load_session(id)?;
        let best_moves = self.store.top_moves(Some(id), SUMMARY_TOP_MOVES)?;
        Ok(SessionSummary {
            mean_quality: session.mean_quality(),
            success_rate: session.success_rate(),
            tier_distribution: session.tier_totals.clone(),
            engine_tallies: session.engine_tallies.clone(),
            best_moves,
            session,
        })
    }

    pub fn list(&self) -> Result<Vec<AnalysisSession>, SessionError> {
        Ok(self.store.list_sessions()?)
    }

    /// Refused while the session is running.
    pub fn delete(&self, id: Uuid) -> Result<(), SessionError> {
        if let Some(live) = self.live_session(id) {
            if live.is_running() {
                return Err(SessionError::StillRunning(id));
            }
            let _ = live.join();
        }
        self.live.remove(&id);
        self.store.delete_session(id)?;
        info!("Deleted session {}", id);
        Ok(())
    }

    pub fn top_moves(
        &self,
        session: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<MoveRecord>, SessionError> {
        Ok(self.store.top_moves(session, limit)?)
    }

    fn live_session(&self, id: Uuid) -> Option<Arc<LiveSession>> {
        self.live.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    fn launch(
        &self,
        session: AnalysisSession,
        source: PositionSource,
        engines: Option<EngineSet>,
    ) -> Result<SessionProgress, SessionError> {
        let config = Arc::new(session.config.clone());
        let coordinator = config
            .coordinator(config.score_cache())
            .map_err(|err| SessionError::Fatal(format!("could not build worker pool: {}", err)))?;
        let engines = engines.unwrap_or_else(|| config.engine_set(Arc::clone(&self.rules)));
        let handle = Arc::new(SessionHandle::new(&session));
        let id = session.id;

        let runner = SessionRunner {
            settings: config.analysis_settings(),
            analyzer: PositionAnalyzer::new(Arc::clone(&self.rules), coordinator),
            engines,
            store: Arc::clone(&self.store),
            source,
            handle: Arc::clone(&handle),
            session,
        };
        // registered before the thread starts
        let live = Arc::new(LiveSession {
            handle: Arc::clone(&handle),
            thread: Mutex::new(None),
        });
        self.live.insert(id, Arc::clone(&live));

        let progress = handle.progress().as_ref().clone();
        let spawned = thread::Builder::new()
            .name(format!("session-{}", id))
            .spawn(move || runner.run());
        match spawned {
            Ok(thread) => {
                *live.thread.lock().unwrap_or_else(PoisonError::into_inner) = Some(thread);
            }
            Err(err) => {
                self.live.remove(&id);
                return Err(SessionError::Fatal(format!(
                    "could not start session thread: {}",
                    err
                )));
            }
        }
        Ok(progress)
    }
}
