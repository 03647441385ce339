//! Analyze command - score every move of one position.

use std::sync::Arc;

use azul_analysis::analysis::PositionAnalyzer;
use azul_analysis::game::{AzulRules, GamePhase, Rules};
use structopt::StructOpt;

use super::util::{or_exit, ConfigArgs};
use super::Command;

#[derive(StructOpt)]
pub struct AnalyzeArgs {
    #[structopt(long)]
    pub position: String,
    #[structopt(long)]
    pub phase: Option<GamePhase>,
    /// How many of the ranked moves to print.
    #[structopt(short, long, default_value = "10")]
    pub top: usize,
    /// Print the full analysis as JSON.
    #[structopt(long)]
    pub json: bool,
    #[structopt(flatten)]
    pub config: ConfigArgs,
}

impl Command for AnalyzeArgs {
    fn execute(self) {
        let config = or_exit(self.config.load());
        let rules: Arc<dyn Rules> = Arc::new(AzulRules);
        let coordinator = or_exit(config.coordinator(config.score_cache()));
        let analyzer = PositionAnalyzer::new(Arc::clone(&rules), coordinator);
        let engines = config.engine_set(rules);

        let analysis = or_exit(analyzer.analyze_encoded(
            &self.position,
            self.phase,
            &engines,
            &config.analysis_settings(),
        ));
        if self.json {
            println!("{}", or_exit(serde_json::to_string_pretty(&analysis)));
            return;
        }

        println!(
            "{} phase, player {} to move: {} moves in {} ms{}",
            analysis.phase,
            analysis.player,
            analysis.assessments.len(),
            analysis.duration_ms,
            if analysis.truncated { " (truncated)" } else { "" }
        );
        for (rank, assessment) in analysis.ranked().into_iter().take(self.top).enumerate() {
            println!(
                "{:>3}. {:<14} {:>6.1} {:<9} confidence {:.2}",
                rank + 1,
                assessment.azul_move.to_string(),
                assessment.quality_score,
                assessment.tier.to_string(),
                assessment.confidence
            );
        }
        let statistics = &analysis.statistics;
        println!(
            "mean {:.1} best {:.1} worst {:.1} complexity {:.2} disagreement {:.2}",
            statistics.mean_quality_score,
            statistics.best_quality_score,
            statistics.worst_quality_score,
            statistics.complexity,
            statistics.disagreement
        );
    }
}
