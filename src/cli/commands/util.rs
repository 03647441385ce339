//! Shared utilities for commands.

use std::fmt::Display;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use azul_analysis::analysis::ConfigError;
use azul_analysis::game::AzulRules;
use azul_analysis::session::{
    AnalysisConfig, AnalysisProfile, SessionManager, SessionProgress, SessionSummary,
};
use azul_analysis::store::{JsonlStore, MoveRecord};
use structopt::StructOpt;
use uuid::Uuid;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(StructOpt)]
pub struct StoreArgs {
    /// Directory holding the session and result files.
    #[structopt(long, parse(from_os_str), default_value = "azul-analysis-store")]
    pub store: PathBuf,
}

impl StoreArgs {
    pub(crate) fn manager(&self) -> SessionManager {
        let store = or_exit(JsonlStore::open(&self.store));
        SessionManager::new(Arc::new(store), Arc::new(AzulRules))
    }
}

#[derive(StructOpt)]
pub struct ConfigArgs {
    /// JSON analysis configuration; the flags below override it.
    #[structopt(long, parse(from_os_str))]
    pub config: Option<PathBuf>,
    #[structopt(short, long)]
    pub profile: Option<AnalysisProfile>,
    #[structopt(short, long)]
    pub workers: Option<usize>,
    #[structopt(long)]
    pub seed: Option<u64>,
}

impl ConfigArgs {
    pub(crate) fn load(&self) -> Result<AnalysisConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
        if let Some(workers) = self.workers {
            config.worker_count = workers;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Prints the error and exits with a failure status.
pub(crate) fn or_exit<T, E: Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    }
}

pub(crate) fn print_progress(progress: &SessionProgress) {
    let quality = progress
        .mean_quality
        .map_or_else(|| "-".to_string(), |mean| format!("{:.1}", mean));
    println!(
        "{} {:<9} {:>5.1}% analyzed {} failed {} of {} mean quality {} ({} ms)",
        progress.id,
        progress.status.to_string(),
        progress.percent_complete,
        progress.positions_analyzed,
        progress.positions_failed,
        progress.target_count,
        quality,
        progress.elapsed_ms
    );
}

pub(crate) fn print_move_records(records: &[MoveRecord]) {
    for (rank, record) in records.iter().enumerate() {
        let assessment = &record.assessment;
        println!(
            "{:>3}. {:>6.1} {:<9} {:<14} {}#{} {}",
            rank + 1,
            assessment.quality_score,
            assessment.tier.to_string(),
            assessment.azul_move.to_string(),
            record.session_id,
            record.sequence,
            record.position_id
        );
    }
}

pub(crate) fn print_summary(summary: &SessionSummary) {
    print_progress(&SessionProgress::of(&summary.session));
    println!("success rate {:.1}%", 100.0 * summary.success_rate);
    for (tier, count) in &summary.tier_distribution {
        println!("  {:<9} {}", tier.to_string(), count);
    }
    for (engine, tally) in &summary.engine_tallies {
        println!(
            "  {:<10} succeeded {} timeouts {} errors {} invalid {}",
            engine, tally.succeeded, tally.timeouts, tally.errors, tally.invalid_simulations
        );
    }
    if let Some(reason) = &summary.session.failure_reason {
        println!("failure: {}", reason);
    }
    print_move_records(&summary.best_moves);
}

/// Reports progress until the session finishes, then prints its summary.
pub(crate) fn follow(manager: &SessionManager, id: Uuid) {
    loop {
        let progress = or_exit(manager.progress(id));
        if progress.status.is_finished() {
            break;
        }
        print_progress(&progress);
        thread::sleep(POLL_INTERVAL);
    }
    or_exit(manager.wait(id));
    print_summary(&or_exit(manager.summary(id)));
}
