use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::derived::{enrich, enrich_all};
use super::domain::{EvaluationDraft, EvaluationId, EvaluationRecord, OwnerId, ValidationError};
use super::repository::{EvaluationRepository, RepositoryError};
use crate::comparison::{
    compare_metrics, default_catalog, select_cohort, CohortDefaults, ComparisonBase,
    ComparisonMetric, ComparisonSpec,
};
use crate::scoring::{ScoringConfig, ScoringEngine, ScoringResult};

/// Service composing the repository, cohort selection and both engines.
pub struct EvaluationService<R> {
    repository: Arc<R>,
    engine: Arc<ScoringEngine>,
    catalog: Arc<Vec<ComparisonSpec>>,
    cohort_defaults: CohortDefaults,
}

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

/// Per-metric ranking of one evaluation against a cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub subject_id: EvaluationId,
    pub base: ComparisonBase,
    pub base_label: String,
    pub cohort_size: usize,
    pub metrics: Vec<ComparisonMetric>,
}

impl<R> EvaluationService<R>
where
    R: EvaluationRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: ScoringConfig) -> Self {
        Self::with_catalog(repository, config, default_catalog())
    }

    pub fn with_catalog(
        repository: Arc<R>,
        config: ScoringConfig,
        catalog: Vec<ComparisonSpec>,
    ) -> Self {
        Self {
            repository,
            engine: Arc::new(ScoringEngine::new(config)),
            catalog: Arc::new(catalog),
            cohort_defaults: CohortDefaults::default(),
        }
    }

    pub fn with_cohort_defaults(mut self, defaults: CohortDefaults) -> Self {
        self.cohort_defaults = defaults;
        self
    }

    pub fn cohort_defaults(&self) -> CohortDefaults {
        self.cohort_defaults
    }

    pub fn scoring_config(&self) -> &ScoringConfig {
        self.engine.config()
    }

    /// Validate and store a new evaluation.
    pub fn create(
        &self,
        owner: OwnerId,
        draft: EvaluationDraft,
    ) -> Result<EvaluationRecord, EvaluationServiceError> {
        draft.validate()?;
        let record = draft.into_record(next_evaluation_id(), owner, Utc::now());
        let stored = self.repository.insert(record)?;
        info!(evaluation_id = %stored.id.0, owner = %stored.owner.0, "evaluation stored");
        Ok(stored)
    }

    pub fn get(&self, id: &EvaluationId) -> Result<EvaluationRecord, EvaluationServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Clear the draft flag so the evaluation joins future cohorts.
    pub fn finalize(&self, id: &EvaluationId) -> Result<EvaluationRecord, EvaluationServiceError> {
        let mut record = self.get(id)?;
        if record.is_draft {
            record.is_draft = false;
            self.repository.update(record.clone())?;
            info!(evaluation_id = %id.0, "evaluation finalized");
        }
        Ok(record)
    }

    pub fn list(&self, owner: &OwnerId) -> Result<Vec<EvaluationRecord>, EvaluationServiceError> {
        Ok(self.repository.list_by_owner(owner)?)
    }

    /// Rank an evaluation against the owner's other evaluations.
    pub fn compare(
        &self,
        id: &EvaluationId,
        base: ComparisonBase,
        as_of: DateTime<Utc>,
    ) -> Result<ComparisonReport, EvaluationServiceError> {
        let subject = self.get(id)?;
        let pool = self.repository.list_by_owner(&subject.owner)?;
        let cohort = select_cohort(&subject, &pool, base, as_of);

        let enriched_subject = enrich(&subject);
        let enriched_cohort = enrich_all(cohort.iter().copied());
        let metrics = compare_metrics(&enriched_subject, &enriched_cohort, &self.catalog);

        debug!(
            evaluation_id = %id.0,
            cohort_size = cohort.len(),
            ranked_metrics = metrics.len(),
            "comparison computed"
        );

        Ok(ComparisonReport {
            subject_id: subject.id.clone(),
            base,
            base_label: base.label(),
            cohort_size: cohort.len(),
            metrics,
        })
    }

    /// Compute the weighted composite score for an evaluation.
    pub fn score(
        &self,
        id: &EvaluationId,
        base: ComparisonBase,
        as_of: DateTime<Utc>,
    ) -> Result<ScoringResult, EvaluationServiceError> {
        let subject = self.get(id)?;
        let pool = self.repository.list_by_owner(&subject.owner)?;
        let cohort = select_cohort(&subject, &pool, base, as_of);

        let enriched_subject = enrich(&subject);
        let enriched_cohort = enrich_all(cohort.iter().copied());
        let result = self.engine.score(&enriched_subject, &enriched_cohort);

        debug!(
            evaluation_id = %id.0,
            cohort_size = result.comparison_count,
            total_score = ?result.total_score,
            recommendation = result.recommendation.label(),
            "score computed"
        );

        Ok(result)
    }
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
