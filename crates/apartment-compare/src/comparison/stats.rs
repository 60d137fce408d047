use serde::{Deserialize, Serialize};

/// Cohort statistics for one metric, seen from the subject's side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub average: f64,
    pub best: f64,
    pub worst: f64,
    /// Cohort members the subject strictly beats. Ties are never counted.
    pub better_count: usize,
    /// Raw percentile in the metric's natural direction, 0-100.
    pub percentile: f64,
    pub total: usize,
}

impl Stats {
    /// Percentile re-expressed so that a higher value is always better.
    pub fn effective_percentile(&self, higher_is_better: bool) -> f64 {
        if higher_is_better {
            self.percentile
        } else {
            100.0 - self.percentile
        }
    }
}

/// Ranks `subject_value` against a cohort that must not contain the subject.
///
/// Non-finite cohort values are ignored. Returns `None` when no finite value
/// remains, which means no comparison is possible for this metric.
pub fn compute_stats(
    cohort_values: &[f64],
    subject_value: f64,
    higher_is_better: bool,
) -> Option<Stats> {
    let values = finite_values(cohort_values.iter().copied());
    let average = mean(&values)?;

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (best, worst) = if higher_is_better {
        (max, min)
    } else {
        (min, max)
    };

    let better_count = values
        .iter()
        .filter(|value| {
            if higher_is_better {
                **value < subject_value
            } else {
                **value > subject_value
            }
        })
        .count();
    let total = values.len();

    Some(Stats {
        average,
        best,
        worst,
        better_count,
        percentile: better_count as f64 / total as f64 * 100.0,
        total,
    })
}

pub(crate) fn finite_values<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().filter(|value| value.is_finite()).collect()
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
