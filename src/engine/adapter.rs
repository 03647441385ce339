//! Uniform, fault-isolating wrapper around an [`Evaluator`].
//!
//! The adapter applies the move through the rules collaborator, runs the
//! engine on its own thread, and waits at most the time budget for a reply.
//! Every way the engine can fail comes back as [`EngineScore::Failure`]; an
//! engine that overruns keeps running detached and its late answer is
//! discarded.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::azul_move::AzulMove;
use crate::game::{AzulState, Rules};

use super::evaluator::{EngineFault, EvaluationInput, Evaluator};
use super::score::{EngineCategory, EngineScore, EngineTally, FailureKind};

pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(1);

/// Call counters, updated lock-free from worker threads.
#[derive(Default, Debug)]
pub struct AdapterMetrics {
    calls: AtomicU64,
    succeeded: AtomicU64,
    timeouts: AtomicU64,
    errors: AtomicU64,
    invalid_simulations: AtomicU64,
}

impl AdapterMetrics {
    fn record(&self, score: &EngineScore) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let counter = match score {
            EngineScore::Success { .. } => &self.succeeded,
            EngineScore::Failure { reason } => match reason {
                FailureKind::Timeout => &self.timeouts,
                FailureKind::EngineError(_) => &self.errors,
                FailureKind::InvalidMoveSimulation(_) => &self.invalid_simulations,
            },
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> EngineTally {
        EngineTally {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            invalid_simulations: self.invalid_simulations.load(Ordering::Relaxed),
        }
    }
}

pub struct EngineAdapter {
    name: String,
    category: EngineCategory,
    evaluator: Arc<dyn Evaluator>,
    rules: Arc<dyn Rules>,
    time_budget: Duration,
    enabled: bool,
    metrics: AdapterMetrics,
}

impl EngineAdapter {
    pub fn new(
        name: &str,
        category: EngineCategory,
        evaluator: Arc<dyn Evaluator>,
        rules: Arc<dyn Rules>,
    ) -> Self {
        Self {
            name: name.to_string(),
            category,
            evaluator,
            rules,
            time_budget: DEFAULT_TIME_BUDGET,
            enabled: true,
            metrics: AdapterMetrics::default(),
        }
    }

    pub fn with_time_budget(mut self, time_budget: Duration) -> Self {
        self.time_budget = time_budget;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> EngineCategory {
        self.category
    }

    pub fn time_budget(&self) -> Duration {
        self.time_budget
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn metrics(&self) -> &AdapterMetrics {
        &self.metrics
    }

    /// Scores `azul_move` in `state`. Never panics and never blocks longer
    /// than `time_budget` past the move application.
    pub fn evaluate(
        &self,
        state: &AzulState,
        azul_move: &AzulMove,
        time_budget: Duration,
    ) -> EngineScore {
        let score = self.run(state, azul_move, time_budget);
        if let EngineScore::Failure { reason } = &score {
            debug!("Engine {} failed on {}: {}", self.name, azul_move, reason);
        }
        self.metrics.record(&score);
        score
    }

    fn run(&self, state: &AzulState, azul_move: &AzulMove, time_budget: Duration) -> EngineScore {
        let applied = panic::catch_unwind(AssertUnwindSafe(|| self.rules.apply(state, azul_move)));
        let after = match applied {
            Ok(Ok(after)) => after,
            Ok(Err(err)) => {
                return EngineScore::failure(FailureKind::InvalidMoveSimulation(err.to_string()))
            }
            Err(payload) => {
                return EngineScore::failure(FailureKind::InvalidMoveSimulation(format!(
                    "rules panicked: {}",
                    panic_message(payload.as_ref())
                )))
            }
        };

        let input = EvaluationInput {
            before: state.clone(),
            after,
            azul_move: *azul_move,
            player: state.current_player,
            deadline: Instant::now() + time_budget,
        };
        let (sender, receiver) = mpsc::channel();
        let evaluator = Arc::clone(&self.evaluator);
        let spawned = thread::Builder::new()
            .name(format!("engine-{}", self.name))
            .spawn(move || {
                // the receiver is gone if we already timed out
                let _ = sender.send(evaluator.evaluate(&input));
            });
        if let Err(err) = spawned {
            return EngineScore::failure(FailureKind::EngineError(format!(
                "could not start engine thread: {}",
                err
            )));
        }

        match receiver.recv_timeout(time_budget) {
            Ok(Ok(engine_value)) => self.normalize(engine_value.value, engine_value.metadata),
            Ok(Err(EngineFault::OutOfTime)) => EngineScore::failure(FailureKind::Timeout),
            Ok(Err(fault)) => EngineScore::failure(FailureKind::EngineError(fault.to_string())),
            Err(RecvTimeoutError::Timeout) => EngineScore::failure(FailureKind::Timeout),
            Err(RecvTimeoutError::Disconnected) => {
                EngineScore::failure(FailureKind::EngineError("engine panicked".to_string()))
            }
        }
    }

    fn normalize(
        &self,
        raw: f64,
        metadata: std::collections::BTreeMap<String, f64>,
    ) -> EngineScore {
        let (low, high) = self.evaluator.value_range();
        if !raw.is_finite() || !(high > low) {
            return EngineScore::failure(FailureKind::EngineError(
                EngineFault::NonFinite.to_string(),
            ));
        }
        let value = (100.0 * (raw - low) / (high - low)).max(0.0).min(100.0);
        EngineScore::Success {
            value,
            raw,
            metadata,
        }
    }
}

/// The message carried by a panic payload, when it has one.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown fault".to_string())
}
