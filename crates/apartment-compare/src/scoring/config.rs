use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::evaluations::MetricKey;

/// Declarative scoring setup: weighted metrics plus the recommendation ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub metrics: Vec<ScoringMetricConfig>,
    pub recommendation: RecommendationLadder,
}

/// One weighted metric. Weights are relative and need not sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringMetricConfig {
    pub key: MetricKey,
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub lower_is_better: bool,
    pub category: MetricCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Financial,
    Physical,
}

/// Tiers are walked in the order given; the first one whose threshold the
/// composite score reaches wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationLadder {
    pub tiers: Vec<RecommendationTier>,
    pub fallback: String,
    pub insufficient_data: String,
    pub not_comparable: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationTier {
    pub min_score: f64,
    pub label: String,
}

impl RecommendationTier {
    fn new(min_score: f64, label: &str) -> Self {
        Self {
            min_score,
            label: label.to_string(),
        }
    }
}

impl ScoringMetricConfig {
    fn new(
        key: MetricKey,
        weight: f64,
        lower_is_better: bool,
        category: MetricCategory,
    ) -> Self {
        Self {
            key,
            name: key.label().to_string(),
            weight,
            lower_is_better,
            category,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl ScoringConfig {
    /// Built-in weights; `config/scoring.json` ships the same document.
    pub fn standard() -> Self {
        Self {
            metrics: vec![
                ScoringMetricConfig::new(
                    MetricKey::PricePerSqm,
                    30.0,
                    true,
                    MetricCategory::Financial,
                ),
                ScoringMetricConfig::new(
                    MetricKey::FeePerSqm,
                    20.0,
                    true,
                    MetricCategory::Financial,
                ),
                ScoringMetricConfig::new(
                    MetricKey::DebtPerSqm,
                    15.0,
                    true,
                    MetricCategory::Financial,
                ),
                ScoringMetricConfig::new(
                    MetricKey::CashflowPerSqm,
                    5.0,
                    false,
                    MetricCategory::Financial,
                ),
                ScoringMetricConfig::new(
                    MetricKey::PhysicalAverage,
                    30.0,
                    false,
                    MetricCategory::Physical,
                ),
            ],
            recommendation: RecommendationLadder {
                tiers: vec![
                    RecommendationTier::new(75.0, "Strong candidate"),
                    RecommendationTier::new(60.0, "Good candidate"),
                    RecommendationTier::new(45.0, "Worth considering"),
                    RecommendationTier::new(30.0, "Proceed with caution"),
                ],
                fallback: "Not recommended".to_string(),
                insufficient_data: "Insufficient data".to_string(),
                not_comparable: "Comparison not possible".to_string(),
            },
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ScoringConfigError> {
        let config: ScoringConfig = serde_json::from_str(raw)?;
        config.validate()?;

        if !config.recommendation.is_descending() {
            warn!("recommendation tiers are not in descending order; they are evaluated as listed");
        }

        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoringConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ScoringConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn total_weight(&self) -> f64 {
        self.metrics.iter().map(|metric| metric.weight).sum()
    }

    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        if self.metrics.is_empty() {
            return Err(ScoringConfigError::NoMetrics);
        }

        for metric in &self.metrics {
            if !metric.weight.is_finite() || metric.weight < 0.0 {
                return Err(ScoringConfigError::InvalidWeight {
                    metric: metric.name.clone(),
                    weight: metric.weight,
                });
            }
        }

        if self.total_weight() <= 0.0 {
            return Err(ScoringConfigError::NoWeight);
        }

        for tier in &self.recommendation.tiers {
            if !tier.min_score.is_finite() {
                return Err(ScoringConfigError::InvalidThreshold {
                    label: tier.label.clone(),
                });
            }
        }

        Ok(())
    }
}

impl RecommendationLadder {
    fn is_descending(&self) -> bool {
        self.tiers
            .windows(2)
            .all(|pair| pair[0].min_score >= pair[1].min_score)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("failed to read scoring config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid scoring config document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scoring config must list at least one metric")]
    NoMetrics,
    #[error("metric '{metric}' has invalid weight {weight}; weights must be finite and non-negative")]
    InvalidWeight { metric: String, weight: f64 },
    #[error("scoring config weights sum to zero")]
    NoWeight,
    #[error("recommendation tier '{label}' has a non-finite threshold")]
    InvalidThreshold { label: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_document_matches_standard_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/scoring.json");
        let loaded = ScoringConfig::from_path(path).expect("shipped config loads");
        assert_eq!(loaded, ScoringConfig::standard());
        assert_eq!(loaded.total_weight(), 100.0);
    }

    #[test]
    fn rejects_negative_weights() {
        let raw = r#"{
            "metrics": [
                {"key": "price_per_sqm", "name": "Price", "weight": -1, "lower_is_better": true, "category": "financial"}
            ],
            "recommendation": {"tiers": [], "fallback": "No", "insufficient_data": "?", "not_comparable": "-"}
        }"#;

        match ScoringConfig::from_json(raw) {
            Err(ScoringConfigError::InvalidWeight { metric, weight }) => {
                assert_eq!(metric, "Price");
                assert_eq!(weight, -1.0);
            }
            other => panic!("expected invalid weight, got {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_metric_list_and_unknown_keys() {
        let empty = r#"{
            "metrics": [],
            "recommendation": {"tiers": [], "fallback": "No", "insufficient_data": "?", "not_comparable": "-"}
        }"#;
        assert!(matches!(
            ScoringConfig::from_json(empty),
            Err(ScoringConfigError::NoMetrics)
        ));

        let unknown = r#"{
            "metrics": [
                {"key": "view_quality", "name": "View", "weight": 1, "category": "physical"}
            ],
            "recommendation": {"tiers": [], "fallback": "No", "insufficient_data": "?", "not_comparable": "-"}
        }"#;
        assert!(matches!(
            ScoringConfig::from_json(unknown),
            Err(ScoringConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ScoringConfig::from_path("/nonexistent/scoring.json").expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/scoring.json"));
    }
}
