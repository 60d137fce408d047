use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{EvaluationDraft, EvaluationId, OwnerId};
use super::repository::{EvaluationRepository, RepositoryError};
use super::service::{EvaluationService, EvaluationServiceError};
use crate::comparison::{ComparisonBase, UnknownComparisonBase};

/// Router builder exposing evaluation storage, comparison and scoring.
pub fn evaluation_router<R>(service: Arc<EvaluationService<R>>) -> Router
where
    R: EvaluationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/owners/:owner/evaluations",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/evaluations/:evaluation_id", get(fetch_handler::<R>))
        .route(
            "/api/v1/evaluations/:evaluation_id/finalize",
            post(finalize_handler::<R>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/comparison",
            get(comparison_handler::<R>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/score",
            get(score_handler::<R>),
        )
        .with_state(service)
}

/// Query string selecting the comparison base.
#[derive(Debug, Default, Deserialize)]
pub struct ComparisonQuery {
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub tolerance: Option<f64>,
}

impl ComparisonQuery {
    fn resolve<R>(
        &self,
        service: &EvaluationService<R>,
    ) -> Result<ComparisonBase, UnknownComparisonBase>
    where
        R: EvaluationRepository + 'static,
    {
        let defaults = service.cohort_defaults();
        ComparisonBase::from_query(
            self.base.as_deref().unwrap_or_default(),
            self.days.unwrap_or(defaults.recent_days),
            self.tolerance.unwrap_or(defaults.similar_tolerance_pct),
        )
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(owner): Path<String>,
    axum::Json(draft): axum::Json<EvaluationDraft>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.create(OwnerId(owner), draft) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(owner): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.list(&OwnerId(owner)) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn fetch_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.get(&EvaluationId(evaluation_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn finalize_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.finalize(&EvaluationId(evaluation_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn comparison_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(evaluation_id): Path<String>,
    Query(query): Query<ComparisonQuery>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    let base = match query.resolve(&service) {
        Ok(base) => base,
        Err(err) => return bad_request(err),
    };

    match service.compare(&EvaluationId(evaluation_id), base, Utc::now()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(evaluation_id): Path<String>,
    Query(query): Query<ComparisonQuery>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    let base = match query.resolve(&service) {
        Ok(base) => base,
        Err(err) => return bad_request(err),
    };

    match service.score(&EvaluationId(evaluation_id), base, Utc::now()) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err) => error_response(err),
    }
}

fn bad_request(err: UnknownComparisonBase) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn error_response(err: EvaluationServiceError) -> Response {
    let status = match &err {
        EvaluationServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EvaluationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        EvaluationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        EvaluationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
