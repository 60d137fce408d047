use serde::{Deserialize, Serialize};

use super::config::RecommendationLadder;

/// Outcome of the recommendation lookup. Every variant carries the
/// configured label so callers can render it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    Tier { label: String, min_score: f64 },
    /// Composite score fell below every configured tier.
    Fallback { label: String },
    /// Cohort present but no metric could be scored.
    InsufficientData { label: String },
    /// Empty cohort; nothing to compare against.
    ComparisonNotPossible { label: String },
}

impl Recommendation {
    pub fn label(&self) -> &str {
        match self {
            Recommendation::Tier { label, .. }
            | Recommendation::Fallback { label }
            | Recommendation::InsufficientData { label }
            | Recommendation::ComparisonNotPossible { label } => label,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(
            self,
            Recommendation::Tier { .. } | Recommendation::Fallback { .. }
        )
    }
}

pub(crate) fn recommend(ladder: &RecommendationLadder, composite: Option<u8>) -> Recommendation {
    let Some(score) = composite else {
        return Recommendation::InsufficientData {
            label: ladder.insufficient_data.clone(),
        };
    };

    ladder
        .tiers
        .iter()
        .find(|tier| tier.min_score <= f64::from(score))
        .map(|tier| Recommendation::Tier {
            label: tier.label.clone(),
            min_score: tier.min_score,
        })
        .unwrap_or_else(|| Recommendation::Fallback {
            label: ladder.fallback.clone(),
        })
}

pub(crate) fn not_comparable(ladder: &RecommendationLadder) -> Recommendation {
    Recommendation::ComparisonNotPossible {
        label: ladder.not_comparable.clone(),
    }
}
