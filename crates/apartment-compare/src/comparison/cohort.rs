use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluations::{enrich, EvaluationRecord, MetricKey};

/// Which of an owner's other evaluations a subject is compared against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparisonBase {
    #[default]
    AllOthers,
    /// Evaluations created within `days` before the reference instant.
    Recent { days: u32 },
    /// Evaluations priced within `tolerance_pct` percent of the subject.
    SimilarPrice { tolerance_pct: f64 },
    /// Evaluations sized within `tolerance_pct` percent of the subject.
    SimilarSize { tolerance_pct: f64 },
}

impl ComparisonBase {
    /// Parses the `base` query value used by the HTTP API and CLI.
    pub fn from_query(
        name: &str,
        days: u32,
        tolerance_pct: f64,
    ) -> Result<Self, UnknownComparisonBase> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "all" | "all_others" => Ok(Self::AllOthers),
            "recent" | "last_month" => Ok(Self::Recent { days }),
            "similar_price" | "price" => Ok(Self::SimilarPrice { tolerance_pct }),
            "similar_size" | "size" => Ok(Self::SimilarSize { tolerance_pct }),
            _ => Err(UnknownComparisonBase(name.to_string())),
        }
    }

    pub fn label(&self) -> String {
        match self {
            ComparisonBase::AllOthers => "all other evaluations".to_string(),
            ComparisonBase::Recent { days } => format!("evaluations from the last {days} days"),
            ComparisonBase::SimilarPrice { tolerance_pct } => {
                format!("price within {tolerance_pct:.0}%")
            }
            ComparisonBase::SimilarSize { tolerance_pct } => {
                format!("size within {tolerance_pct:.0}%")
            }
        }
    }
}

/// Window and band applied when a base is requested without explicit values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortDefaults {
    pub recent_days: u32,
    pub similar_tolerance_pct: f64,
}

impl Default for CohortDefaults {
    fn default() -> Self {
        Self {
            recent_days: 30,
            similar_tolerance_pct: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown comparison base '{0}' (expected all, recent, similar_price or similar_size)")]
pub struct UnknownComparisonBase(pub String);

/// Picks the cohort for `subject` out of `pool`.
///
/// The subject itself and draft evaluations are never part of a cohort.
pub fn select_cohort<'a>(
    subject: &EvaluationRecord,
    pool: &'a [EvaluationRecord],
    base: ComparisonBase,
    as_of: DateTime<Utc>,
) -> Vec<&'a EvaluationRecord> {
    let candidates = pool
        .iter()
        .filter(|record| record.id != subject.id && !record.is_draft);

    match base {
        ComparisonBase::AllOthers => candidates.collect(),
        ComparisonBase::Recent { days } => {
            // A window reaching past the calendar's range has no lower bound.
            let cutoff = Duration::try_days(i64::from(days))
                .and_then(|window| as_of.checked_sub_signed(window));
            candidates
                .filter(|record| {
                    record.created_at <= as_of
                        && cutoff.map_or(true, |cutoff| record.created_at >= cutoff)
                })
                .collect()
        }
        ComparisonBase::SimilarPrice { tolerance_pct } => {
            within_tolerance(subject, candidates, MetricKey::Price, tolerance_pct)
        }
        ComparisonBase::SimilarSize { tolerance_pct } => {
            within_tolerance(subject, candidates, MetricKey::FloorArea, tolerance_pct)
        }
    }
}

fn within_tolerance<'a, I>(
    subject: &EvaluationRecord,
    candidates: I,
    key: MetricKey,
    tolerance_pct: f64,
) -> Vec<&'a EvaluationRecord>
where
    I: Iterator<Item = &'a EvaluationRecord>,
{
    let Some(anchor) = enrich(subject)
        .metric(key)
        .filter(|value| value.is_finite() && *value > 0.0)
    else {
        return Vec::new();
    };
    let band = anchor * tolerance_pct.max(0.0) / 100.0;

    candidates
        .filter(|record| {
            enrich(record)
                .metric(key)
                .filter(|value| value.is_finite())
                .map(|value| (value - anchor).abs() <= band)
                .unwrap_or(false)
        })
        .collect()
}
