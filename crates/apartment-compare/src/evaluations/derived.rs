//! Derived per-area and condition figures.
//!
//! Derived values are recomputed on every comparison pass from the live
//! records and are never written back to storage.

use serde::{Deserialize, Serialize};

use super::domain::{EvaluationRecord, PhysicalAspect};

/// Figures computed from a record rather than stored on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub price_per_sqm: Option<f64>,
    pub fee_per_sqm: Option<f64>,
    pub physical_average: Option<f64>,
}

impl DerivedMetrics {
    pub fn from_record(record: &EvaluationRecord) -> Self {
        Self {
            price_per_sqm: price_per_sqm(record),
            fee_per_sqm: fee_per_sqm(record),
            physical_average: physical_average(record),
        }
    }
}

/// Read-only view pairing a record with its derived figures.
#[derive(Debug, Clone, Copy)]
pub struct EnrichedEvaluation<'a> {
    pub record: &'a EvaluationRecord,
    pub derived: DerivedMetrics,
}

impl<'a> EnrichedEvaluation<'a> {
    pub fn metric(&self, key: MetricKey) -> Option<f64> {
        let figures = &self.record.figures;
        match key {
            MetricKey::FloorArea => figures.floor_area,
            MetricKey::AskingPrice => figures.asking_price,
            MetricKey::FinalPrice => figures.final_price,
            MetricKey::Price => effective_price(self.record),
            MetricKey::MonthlyFee => figures.monthly_fee,
            MetricKey::DebtPerSqm => figures.debt_per_sqm,
            MetricKey::CashflowPerSqm => figures.cashflow_per_sqm,
            MetricKey::PricePerSqm => self.derived.price_per_sqm,
            MetricKey::FeePerSqm => self.derived.fee_per_sqm,
            MetricKey::PhysicalAverage => self.derived.physical_average,
            MetricKey::Rating(aspect) => self
                .record
                .ratings
                .get(aspect)
                .map(|rated| f64::from(rated.rating)),
        }
    }
}

pub fn enrich(record: &EvaluationRecord) -> EnrichedEvaluation<'_> {
    EnrichedEvaluation {
        record,
        derived: DerivedMetrics::from_record(record),
    }
}

pub fn enrich_all<'a, I>(records: I) -> Vec<EnrichedEvaluation<'a>>
where
    I: IntoIterator<Item = &'a EvaluationRecord>,
{
    records.into_iter().map(enrich).collect()
}

/// Numeric attribute a comparison or scoring pass can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    FloorArea,
    AskingPrice,
    FinalPrice,
    /// Final price when known, otherwise the asking price.
    Price,
    MonthlyFee,
    DebtPerSqm,
    CashflowPerSqm,
    PricePerSqm,
    FeePerSqm,
    PhysicalAverage,
    Rating(PhysicalAspect),
}

impl MetricKey {
    pub fn label(&self) -> &'static str {
        match self {
            MetricKey::FloorArea => "Floor area",
            MetricKey::AskingPrice => "Asking price",
            MetricKey::FinalPrice => "Final price",
            MetricKey::Price => "Price",
            MetricKey::MonthlyFee => "Monthly fee",
            MetricKey::DebtPerSqm => "Association debt per sqm",
            MetricKey::CashflowPerSqm => "Association cashflow per sqm",
            MetricKey::PricePerSqm => "Price per sqm",
            MetricKey::FeePerSqm => "Fee per sqm",
            MetricKey::PhysicalAverage => "Physical condition",
            MetricKey::Rating(aspect) => aspect.label(),
        }
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite() && *value > 0.0)
}

fn effective_price(record: &EvaluationRecord) -> Option<f64> {
    positive(record.figures.final_price).or(record.figures.asking_price)
}

fn price_per_sqm(record: &EvaluationRecord) -> Option<f64> {
    let price = positive(effective_price(record))?;
    let area = positive(record.figures.floor_area)?;
    Some(price / area)
}

fn fee_per_sqm(record: &EvaluationRecord) -> Option<f64> {
    if let Some(stored) = record.figures.fee_per_sqm.filter(|value| value.is_finite()) {
        return Some(stored);
    }

    let fee = record.figures.monthly_fee.filter(|value| value.is_finite())?;
    let area = positive(record.figures.floor_area)?;
    Some(fee / area)
}

fn physical_average(record: &EvaluationRecord) -> Option<f64> {
    let (sum, count) = record
        .ratings
        .present()
        .filter(|(_, rating)| *rating > 0)
        .fold((0u32, 0u32), |(sum, count), (_, rating)| {
            (sum + u32::from(rating), count + 1)
        });

    if count == 0 {
        None
    } else {
        Some(f64::from(sum) / f64::from(count))
    }
}
