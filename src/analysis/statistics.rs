//! Position-level aggregates over a list of move assessments.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::assessment::MoveQualityAssessment;
use super::quality::QualityTier;

/// Move count at which the move-count half of the complexity score saturates.
const COMPLEXITY_MOVE_SCALE: f64 = 150.0;
/// Score spread at which the variance half of the complexity score saturates.
const COMPLEXITY_SPREAD_SCALE: f64 = 25.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionStatistics {
    pub move_count: usize,
    /// All three are 0 when the position has no moves.
    pub mean_quality_score: f64,
    pub best_quality_score: f64,
    pub worst_quality_score: f64,
    pub best_move_index: Option<usize>,
    pub tier_distribution: BTreeMap<QualityTier, usize>,
    /// Mean pairwise Pearson correlation between engines over the moves both
    /// scored. `None` when no pair of engines can be compared.
    pub engine_consensus: Option<f64>,
    /// Mean per-move standard deviation of the engines' scores.
    pub disagreement: f64,
    pub complexity: f64,
}

impl PositionStatistics {
    pub fn compute(assessments: &[MoveQualityAssessment]) -> Self {
        let mut tier_distribution = QualityTier::empty_distribution();
        for assessment in assessments {
            *tier_distribution.entry(assessment.tier).or_insert(0) += 1;
        }

        let scores: Vec<f64> = assessments.iter().map(|a| a.quality_score).collect();
        let best_move_index = scores
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (index, &score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((index, score)),
            })
            .map(|(index, _)| index);

        let (mean_quality_score, best_quality_score, worst_quality_score) = if scores.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                mean(&scores),
                scores.iter().cloned().fold(f64::MIN, f64::max),
                scores.iter().cloned().fold(f64::MAX, f64::min),
            )
        };

        Self {
            move_count: assessments.len(),
            mean_quality_score,
            best_quality_score,
            worst_quality_score,
            best_move_index,
            tier_distribution,
            engine_consensus: engine_consensus(assessments),
            disagreement: disagreement(assessments),
            complexity: complexity(assessments.len(), std_dev(&scores)),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() < 2 || xs.len() != ys.len() {
        return None;
    }
    let (mean_x, mean_y) = (mean(xs), mean(ys));
    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        covariance += (x - mean_x) * (y - mean_y);
        variance_x += (x - mean_x).powi(2);
        variance_y += (y - mean_y).powi(2);
    }
    if variance_x <= f64::EPSILON || variance_y <= f64::EPSILON {
        return None;
    }
    Some(covariance / (variance_x.sqrt() * variance_y.sqrt()))
}

fn engine_consensus(assessments: &[MoveQualityAssessment]) -> Option<f64> {
    let engines: Vec<&String> = assessments
        .iter()
        .flat_map(|a| a.engines_used.iter())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut correlations = Vec::new();
    for (i, first) in engines.iter().enumerate() {
        for second in &engines[i + 1..] {
            let (xs, ys): (Vec<f64>, Vec<f64>) = assessments
                .iter()
                .filter_map(|a| Some((a.engine_value(first)?, a.engine_value(second)?)))
                .unzip();
            if let Some(r) = pearson(&xs, &ys) {
                correlations.push(r);
            }
        }
    }

    if correlations.is_empty() {
        None
    } else {
        Some(mean(&correlations))
    }
}

fn disagreement(assessments: &[MoveQualityAssessment]) -> f64 {
    let spreads: Vec<f64> = assessments
        .iter()
        .filter(|a| a.engines_used.len() >= 2)
        .map(|a| {
            let values: Vec<f64> = a
                .engines_used
                .iter()
                .filter_map(|engine| a.engine_value(engine))
                .collect();
            std_dev(&values)
        })
        .collect();
    mean(&spreads)
}

fn complexity(move_count: usize, spread: f64) -> f64 {
    let breadth = 50.0 * (1.0 + move_count as f64).ln() / (1.0 + COMPLEXITY_MOVE_SCALE).ln();
    let volatility = 50.0 * (spread / COMPLEXITY_SPREAD_SCALE).min(1.0);
    (breadth.min(50.0) + volatility).max(0.0).min(100.0)
}
