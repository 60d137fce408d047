//! Comparative statistics: ranks one apartment against a cohort, one metric
//! at a time.

mod cohort;
mod metrics;
mod stats;

pub use cohort::{select_cohort, CohortDefaults, ComparisonBase, UnknownComparisonBase};
pub use metrics::{compare_metrics, default_catalog, ComparisonMetric, ComparisonSpec, MetricUnit};
pub use stats::{compute_stats, Stats};

pub(crate) use stats::{finite_values, mean};
