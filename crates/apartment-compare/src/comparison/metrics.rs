use serde::{Deserialize, Serialize};

use super::stats::compute_stats;
use crate::evaluations::{EnrichedEvaluation, MetricKey};

/// Unit tag handed to the presentation layer; formatting happens there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    Currency,
    CurrencyPerMonth,
    CurrencyPerSqm,
    SquareMeters,
    Rating,
}

/// Describes one metric to rank in a comparison pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSpec {
    pub key: MetricKey,
    pub name: String,
    pub unit: MetricUnit,
    pub higher_is_better: bool,
}

impl ComparisonSpec {
    fn new(key: MetricKey, unit: MetricUnit, higher_is_better: bool) -> Self {
        Self {
            key,
            name: key.label().to_string(),
            unit,
            higher_is_better,
        }
    }
}

/// Metrics ranked by default when comparing an apartment against its cohort.
pub fn default_catalog() -> Vec<ComparisonSpec> {
    vec![
        ComparisonSpec::new(MetricKey::Price, MetricUnit::Currency, false),
        ComparisonSpec::new(MetricKey::PricePerSqm, MetricUnit::CurrencyPerSqm, false),
        ComparisonSpec::new(MetricKey::MonthlyFee, MetricUnit::CurrencyPerMonth, false),
        ComparisonSpec::new(MetricKey::FeePerSqm, MetricUnit::CurrencyPerSqm, false),
        ComparisonSpec::new(MetricKey::FloorArea, MetricUnit::SquareMeters, true),
        ComparisonSpec::new(MetricKey::DebtPerSqm, MetricUnit::CurrencyPerSqm, false),
        ComparisonSpec::new(MetricKey::CashflowPerSqm, MetricUnit::CurrencyPerSqm, true),
        ComparisonSpec::new(MetricKey::PhysicalAverage, MetricUnit::Rating, true),
    ]
}

/// Ranked view of one metric for the subject apartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetric {
    pub key: MetricKey,
    pub name: String,
    pub subject_value: f64,
    pub average: f64,
    pub best: f64,
    pub worst: f64,
    pub percentile: f64,
    pub better_count: usize,
    pub total: usize,
    pub unit: MetricUnit,
    pub higher_is_better: bool,
}

impl ComparisonMetric {
    pub fn effective_percentile(&self) -> f64 {
        if self.higher_is_better {
            self.percentile
        } else {
            100.0 - self.percentile
        }
    }
}

/// Ranks the subject on every catalog metric that both sides can supply.
///
/// Metrics where the subject value is missing, or where no cohort member has
/// a finite value, are left out of the returned list.
pub fn compare_metrics(
    subject: &EnrichedEvaluation<'_>,
    cohort: &[EnrichedEvaluation<'_>],
    catalog: &[ComparisonSpec],
) -> Vec<ComparisonMetric> {
    catalog
        .iter()
        .filter_map(|spec| {
            let subject_value = subject.metric(spec.key).filter(|value| value.is_finite())?;
            let cohort_values: Vec<f64> = cohort
                .iter()
                .filter_map(|member| member.metric(spec.key))
                .collect();
            let stats = compute_stats(&cohort_values, subject_value, spec.higher_is_better)?;

            Some(ComparisonMetric {
                key: spec.key,
                name: spec.name.clone(),
                subject_value,
                average: stats.average,
                best: stats.best,
                worst: stats.worst,
                percentile: stats.percentile,
                better_count: stats.better_count,
                total: stats.total,
                unit: spec.unit,
                higher_is_better: spec.higher_is_better,
            })
        })
        .collect()
}
