use crate::infra::AppState;
use apartment_compare::comparison::{compute_stats, Stats};
use apartment_compare::error::AppError;
use apartment_compare::evaluations::{
    evaluation_router, EvaluationDraft, EvaluationId, EvaluationRecord, EvaluationRepository,
    EvaluationService, EvaluationServiceError, OwnerId,
};
use apartment_compare::scoring::{calculate_score, ScoringConfig, ScoringResult};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Ad-hoc scoring request: nothing is stored and no cohort selection runs.
#[derive(Debug, Deserialize)]
pub(crate) struct ScoringRequest {
    pub(crate) subject: EvaluationDraft,
    #[serde(default)]
    pub(crate) cohort: Vec<EvaluationDraft>,
    /// Overrides the server's scoring config for this request only.
    #[serde(default)]
    pub(crate) config: Option<ScoringConfig>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatsRequest {
    pub(crate) cohort_values: Vec<f64>,
    pub(crate) subject_value: f64,
    #[serde(default = "default_higher_is_better")]
    pub(crate) higher_is_better: bool,
}

fn default_higher_is_better() -> bool {
    true
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum StatsResponse {
    Ranked {
        #[serde(flatten)]
        stats: Stats,
        effective_percentile: f64,
    },
    NoData,
}

pub(crate) fn with_evaluation_routes<R>(service: Arc<EvaluationService<R>>) -> axum::Router
where
    R: EvaluationRepository + 'static,
{
    let scoring_config = Arc::new(service.scoring_config().clone());

    evaluation_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/scoring", axum::routing::post(scoring_endpoint))
        .route("/api/v1/stats", axum::routing::post(stats_endpoint))
        .layer(Extension(scoring_config))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn scoring_endpoint(
    Extension(default_config): Extension<Arc<ScoringConfig>>,
    Json(payload): Json<ScoringRequest>,
) -> Result<Json<ScoringResult>, AppError> {
    let ScoringRequest {
        subject,
        cohort,
        config,
    } = payload;

    let config = match config {
        Some(config) => {
            config.validate()?;
            config
        }
        None => default_config.as_ref().clone(),
    };

    let owner = OwnerId("ad-hoc".to_string());
    let now = Utc::now();
    let subject = adhoc_record(subject, "subject".to_string(), &owner, now)?;
    let cohort = cohort
        .into_iter()
        .enumerate()
        .map(|(index, draft)| adhoc_record(draft, format!("cohort-{}", index + 1), &owner, now))
        .collect::<Result<Vec<_>, _>>()?;

    let result = calculate_score(&subject, &cohort, &config);
    debug!(
        cohort_size = cohort.len(),
        total_score = ?result.total_score,
        "ad-hoc score computed"
    );

    Ok(Json(result))
}

pub(crate) async fn stats_endpoint(Json(payload): Json<StatsRequest>) -> Json<StatsResponse> {
    let StatsRequest {
        cohort_values,
        subject_value,
        higher_is_better,
    } = payload;

    let response = match compute_stats(&cohort_values, subject_value, higher_is_better) {
        Some(stats) => StatsResponse::Ranked {
            effective_percentile: stats.effective_percentile(higher_is_better),
            stats,
        },
        None => StatsResponse::NoData,
    };

    Json(response)
}

fn adhoc_record(
    draft: EvaluationDraft,
    id: String,
    owner: &OwnerId,
    now: chrono::DateTime<Utc>,
) -> Result<EvaluationRecord, AppError> {
    draft
        .validate()
        .map_err(|err| AppError::from(EvaluationServiceError::from(err)))?;
    Ok(draft.into_record(EvaluationId(id), owner.clone(), now))
}
