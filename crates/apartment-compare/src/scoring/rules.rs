use super::config::{ScoringConfig, ScoringMetricConfig};
use super::normalize::{normalized_score, Assessment};
use super::recommendation::{not_comparable, recommend};
use super::{MetricBreakdown, MetricScore, ScoringResult};
use crate::comparison::{finite_values, mean};
use crate::evaluations::EnrichedEvaluation;

pub(crate) fn score_subject(
    subject: &EnrichedEvaluation<'_>,
    cohort: &[EnrichedEvaluation<'_>],
    config: &ScoringConfig,
) -> ScoringResult {
    let total_weight = config.total_weight();

    if cohort.is_empty() {
        let breakdown = config
            .metrics
            .iter()
            .map(|metric| {
                breakdown_entry(
                    metric,
                    subject.metric(metric.key),
                    None,
                    MetricScore::NoComparisonData,
                )
            })
            .collect();

        return ScoringResult {
            total_score: None,
            recommendation: not_comparable(&config.recommendation),
            breakdown,
            comparison_count: 0,
            valid_metric_count: 0,
            total_weight,
            applied_weight: 0.0,
        };
    }

    let mut breakdown = Vec::with_capacity(config.metrics.len());
    let mut weighted_score = 0.0;
    let mut applied_weight = 0.0;
    let mut valid_metric_count = 0;

    for metric in &config.metrics {
        let subject_value = subject.metric(metric.key);
        let cohort_values =
            finite_values(cohort.iter().filter_map(|member| member.metric(metric.key)));

        let Some(cohort_average) = mean(&cohort_values) else {
            breakdown.push(breakdown_entry(
                metric,
                subject_value,
                None,
                MetricScore::NoComparisonData,
            ));
            continue;
        };

        let Some(value) = subject_value.filter(|value| value.is_finite()) else {
            breakdown.push(breakdown_entry(
                metric,
                None,
                Some(cohort_average),
                MetricScore::DataMissing,
            ));
            continue;
        };

        let score = normalized_score(value, cohort_average, metric.lower_is_better);
        weighted_score += score * metric.weight;
        applied_weight += metric.weight;
        valid_metric_count += 1;

        breakdown.push(breakdown_entry(
            metric,
            Some(value),
            Some(cohort_average),
            MetricScore::Scored {
                score,
                assessment: Assessment::from_score(score),
            },
        ));
    }

    let total_score = if applied_weight > 0.0 {
        Some((weighted_score / applied_weight).round().clamp(0.0, 100.0) as u8)
    } else {
        None
    };

    ScoringResult {
        total_score,
        recommendation: recommend(&config.recommendation, total_score),
        breakdown,
        comparison_count: cohort.len(),
        valid_metric_count,
        total_weight,
        applied_weight,
    }
}

fn breakdown_entry(
    metric: &ScoringMetricConfig,
    subject_value: Option<f64>,
    cohort_average: Option<f64>,
    outcome: MetricScore,
) -> MetricBreakdown {
    MetricBreakdown {
        key: metric.key,
        name: metric.name.clone(),
        category: metric.category,
        weight: metric.weight,
        lower_is_better: metric.lower_is_better,
        subject_value,
        cohort_average,
        outcome,
    }
}
