use super::common::*;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::evaluations::router::{comparison_handler, create_handler, ComparisonQuery};
use crate::evaluations::EvaluationService;
use crate::scoring::ScoringConfig;

#[tokio::test]
async fn create_route_returns_created_record() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/owners/owner-lena/evaluations")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&draft(52.0, 2_300_000.0, 2_700.0, 4)).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("owner"), Some(&json!("owner-lena")));
    assert_eq!(payload.get("floor_area"), Some(&json!(52.0)));
    assert!(payload
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .starts_with("eval-"));
}

#[tokio::test]
async fn create_handler_rejects_invalid_ratings() {
    let (service, _) = build_service();
    let mut invalid = draft(52.0, 2_300_000.0, 2_700.0, 4);
    invalid.ratings.balcony = Some(crate::evaluations::RatedAspect::new(0));

    let response = create_handler::<MemoryRepository>(
        State(Arc::new(service)),
        Path("owner-lena".to_string()),
        axum::Json(invalid),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_handler_reports_unavailable_backend() {
    let service = Arc::new(EvaluationService::new(
        Arc::new(UnavailableRepository),
        ScoringConfig::standard(),
    ));

    let response = create_handler::<UnavailableRepository>(
        State(service),
        Path("owner-lena".to_string()),
        axum::Json(draft(52.0, 2_300_000.0, 2_700.0, 4)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn fetch_route_returns_not_found_for_unknown_ids() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/evaluations/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_route_returns_owner_records() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/owners/owner-lena/evaluations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn score_route_returns_breakdown() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/evaluations/subject/score?base=all")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("comparison_count"), Some(&json!(3)));
    assert_eq!(
        payload
            .get("breakdown")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(5)
    );
    assert!(payload
        .pointer("/recommendation/label")
        .and_then(Value::as_str)
        .is_some());
}

#[tokio::test]
async fn comparison_handler_rejects_unknown_base() {
    let (service, _) = seeded_service();

    let response = comparison_handler::<MemoryRepository>(
        State(Arc::new(service)),
        Path("subject".to_string()),
        Query(ComparisonQuery {
            base: Some("neighbours".to_string()),
            ..ComparisonQuery::default()
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comparison_route_returns_ranked_metrics() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/evaluations/subject/comparison?base=similar_price&tolerance=15")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("subject_id"), Some(&json!("subject")));
    assert_eq!(payload.get("cohort_size"), Some(&json!(2)));
    assert!(payload
        .get("metrics")
        .and_then(Value::as_array)
        .map(|metrics| !metrics.is_empty())
        .unwrap_or(false));
}

#[tokio::test]
async fn score_route_accepts_oversized_recent_window() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/evaluations/subject/score?base=recent&days=1000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("comparison_count"), Some(&json!(3)));
}
