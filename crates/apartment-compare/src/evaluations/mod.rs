//! Apartment evaluations: the stored record, derived figures, ingestion and
//! the service/HTTP surface around the comparison and scoring engines.

pub mod derived;
pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use derived::{enrich, enrich_all, DerivedMetrics, EnrichedEvaluation, MetricKey};
pub use domain::{
    ApartmentFigures, EvaluationDraft, EvaluationId, EvaluationRecord, OwnerId, PhysicalAspect,
    PhysicalRatings, RatedAspect, ValidationError,
};
pub use import::{EvaluationCsvImporter, ImportError};
pub use repository::{EvaluationRepository, RepositoryError};
pub use router::evaluation_router;
pub use service::{ComparisonReport, EvaluationService, EvaluationServiceError};
