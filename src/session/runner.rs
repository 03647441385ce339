//! The loop that owns one running session.
//!
//! The runner is the only writer of its [`AnalysisSession`]. Readers see a
//! [`SessionProgress`] snapshot that is replaced wholesale after every
//! position. `stop` is cooperative: the flag is checked between positions,
//! never in the middle of one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use log::{error, info, warn};

use crate::analysis::{AnalysisSettings, PositionAnalyzer};
use crate::engine::EngineSet;
use crate::store::ResultStore;

use super::session::{AnalysisSession, SessionProgress, SessionStatus};
use super::source::PositionSource;

/// State shared between a session's thread and its readers.
pub struct SessionHandle {
    stop_requested: AtomicBool,
    progress: RwLock<Arc<SessionProgress>>,
}

impl SessionHandle {
    pub fn new(session: &AnalysisSession) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            progress: RwLock::new(Arc::new(SessionProgress::of(session))),
        }
    }

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub fn progress(&self) -> Arc<SessionProgress> {
        Arc::clone(&self.progress.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn publish(&self, session: &AnalysisSession) {
        let snapshot = Arc::new(SessionProgress::of(session));
        *self.progress.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

pub struct SessionRunner {
    pub(super) session: AnalysisSession,
    pub(super) analyzer: PositionAnalyzer,
    pub(super) engines: EngineSet,
    pub(super) settings: AnalysisSettings,
    pub(super) store: Arc<dyn ResultStore>,
    pub(super) source: PositionSource,
    pub(super) handle: Arc<SessionHandle>,
}

impl SessionRunner {
    /// Runs until the target is met, the source runs dry, a stop is
    /// requested or the store fails. Returns the final session record.
    pub fn run(mut self) -> AnalysisSession {
        if let Err(err) = self.session.transition(SessionStatus::Running) {
            error!("Session {} cannot start: {}", self.session.id, err);
            return self.session;
        }
        info!(
            "Session {} running ({} profile, target {})",
            self.session.id, self.session.profile, self.session.target_count
        );
        if let Err(err) = self.store.save_session(&self.session) {
            return self.fail(format!("could not save session: {}", err));
        }
        self.handle.publish(&self.session);

        loop {
            if self.handle.stop_requested() {
                return self.finish(SessionStatus::Stopped);
            }
            if self.session.positions_consumed() >= self.session.target_count {
                return self.finish(SessionStatus::Completed);
            }
            let input = match self.source.next() {
                Some(input) => input,
                None => {
                    info!("Session {} exhausted its position source", self.session.id);
                    return self.finish(SessionStatus::Completed);
                }
            };

            self.session.in_progress = 1;
            self.handle.publish(&self.session);

            let sequence = self.session.positions_consumed();
            match self.analyzer.analyze_encoded(
                &input.encoding,
                input.phase,
                &self.engines,
                &self.settings,
            ) {
                Ok(analysis) => {
                    if let Err(err) = self.store.save_position(self.session.id, sequence, &analysis) {
                        return self.fail(format!("could not persist position {}: {}", sequence, err));
                    }
                    self.session.record_analysis(&analysis);
                }
                Err(err) => {
                    warn!(
                        "Session {} position {} failed: {}",
                        self.session.id, sequence, err
                    );
                    self.session.record_failure();
                }
            }
            self.session.in_progress = 0;

            if let Err(err) = self.store.save_session(&self.session) {
                return self.fail(format!("could not save session: {}", err));
            }
            self.handle.publish(&self.session);
        }
    }

    fn finish(mut self, status: SessionStatus) -> AnalysisSession {
        if let Err(err) = self.session.transition(status) {
            error!("Session {}: {}", self.session.id, err);
        }
        info!(
            "Session {} {} after {} positions ({} failed)",
            self.session.id,
            status,
            self.session.positions_analyzed,
            self.session.positions_failed
        );
        if let Err(err) = self.store.save_session(&self.session) {
            return self.fail(format!("could not save session: {}", err));
        }
        self.handle.publish(&self.session);
        self.session
    }

    fn fail(mut self, reason: String) -> AnalysisSession {
        error!("Session {} failed: {}", self.session.id, reason);
        if self.session.transition(SessionStatus::Failed).is_err() {
            // the final save of an already finished session failed
            self.session.status = SessionStatus::Failed;
        }
        self.session.failure_reason = Some(reason);
        if let Err(err) = self.store.save_session(&self.session) {
            error!("Session {} could not record its failure: {}", self.session.id, err);
        }
        self.handle.publish(&self.session);
        self.session
    }
}
