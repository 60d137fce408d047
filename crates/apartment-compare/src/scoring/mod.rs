//! Weighted scoring: normalizes each configured metric against the cohort
//! average and folds them into a composite score and recommendation.

mod config;
mod normalize;
mod recommendation;
mod rules;

pub use config::{
    MetricCategory, RecommendationLadder, RecommendationTier, ScoringConfig, ScoringConfigError,
    ScoringMetricConfig,
};
pub use normalize::{normalized_score, Assessment};
pub use recommendation::Recommendation;

use crate::evaluations::{enrich, enrich_all, EnrichedEvaluation, EvaluationRecord, MetricKey};
use serde::{Deserialize, Serialize};

/// Stateless scorer bound to one scoring configuration.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores an already-enriched subject against an enriched cohort that
    /// excludes the subject.
    pub fn score(
        &self,
        subject: &EnrichedEvaluation<'_>,
        cohort: &[EnrichedEvaluation<'_>],
    ) -> ScoringResult {
        rules::score_subject(subject, cohort, &self.config)
    }
}

/// Enriches the subject and cohort, then scores them with `config`.
pub fn calculate_score(
    subject: &EvaluationRecord,
    cohort: &[EvaluationRecord],
    config: &ScoringConfig,
) -> ScoringResult {
    let subject = enrich(subject);
    let cohort = enrich_all(cohort);
    rules::score_subject(&subject, &cohort, config)
}

/// Per-metric outcome of a scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricScore {
    Scored { score: f64, assessment: Assessment },
    /// No cohort member had a usable value; the metric carries no weight.
    NoComparisonData,
    /// The subject lacks a usable value; the metric carries no weight.
    DataMissing,
}

impl MetricScore {
    pub fn score(&self) -> Option<f64> {
        match self {
            MetricScore::Scored { score, .. } => Some(*score),
            MetricScore::NoComparisonData | MetricScore::DataMissing => None,
        }
    }

    pub fn note(&self) -> &'static str {
        match self {
            MetricScore::Scored { assessment, .. } => assessment.label(),
            MetricScore::NoComparisonData => "no comparison data",
            MetricScore::DataMissing => "data missing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBreakdown {
    pub key: MetricKey,
    pub name: String,
    pub category: MetricCategory,
    pub weight: f64,
    pub lower_is_better: bool,
    pub subject_value: Option<f64>,
    pub cohort_average: Option<f64>,
    pub outcome: MetricScore,
}

/// Composite score, recommendation and the full per-metric trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub total_score: Option<u8>,
    pub recommendation: Recommendation,
    pub breakdown: Vec<MetricBreakdown>,
    pub comparison_count: usize,
    pub valid_metric_count: usize,
    pub total_weight: f64,
    pub applied_weight: f64,
}
