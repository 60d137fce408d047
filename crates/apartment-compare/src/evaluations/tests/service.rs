use super::common::*;
use crate::comparison::ComparisonBase;
use crate::evaluations::domain::{EvaluationId, OwnerId, RatedAspect, ValidationError};
use crate::evaluations::repository::{EvaluationRepository, RepositoryError};
use crate::evaluations::{EvaluationServiceError, MetricKey};
use crate::scoring::{MetricScore, Recommendation};

#[test]
fn create_assigns_identity_and_persists() {
    let (service, repository) = build_service();

    let record = service
        .create(owner(), draft(55.0, 2_200_000.0, 2_800.0, 4))
        .expect("evaluation stored");

    assert!(record.id.0.starts_with("eval-"));
    assert_eq!(record.owner, owner());
    let fetched = repository
        .fetch(&record.id)
        .expect("repository available")
        .expect("record stored");
    assert_eq!(fetched, record);
}

#[test]
fn create_rejects_out_of_range_ratings() {
    let (service, repository) = build_service();
    let mut invalid = draft(55.0, 2_200_000.0, 2_800.0, 4);
    invalid.ratings.storage = Some(RatedAspect::new(7));

    match service.create(owner(), invalid) {
        Err(EvaluationServiceError::Validation(ValidationError::RatingOutOfRange {
            rating, ..
        })) => assert_eq!(rating, 7),
        other => panic!("expected rating validation error, got {other:?}"),
    }
    assert!(repository.list_by_owner(&owner()).unwrap().is_empty());
}

#[test]
fn compare_ranks_subject_against_finalized_neighbours() {
    let (service, _) = seeded_service();

    let report = service
        .compare(
            &EvaluationId("subject".to_string()),
            ComparisonBase::AllOthers,
            reference_time(),
        )
        .expect("comparison computed");

    assert_eq!(report.cohort_size, 3, "draft and subject are excluded");
    let per_sqm = report
        .metrics
        .iter()
        .find(|metric| metric.key == MetricKey::PricePerSqm)
        .expect("price per sqm ranked");
    assert_eq!(per_sqm.subject_value, 45_000.0);
    assert_eq!(per_sqm.average, 50_000.0);
    assert_eq!(per_sqm.better_count, 2);
    assert!((per_sqm.percentile - 66.7).abs() < 0.1);
}

#[test]
fn compare_recent_base_narrows_cohort() {
    let (service, _) = seeded_service();

    let report = service
        .compare(
            &EvaluationId("subject".to_string()),
            ComparisonBase::Recent { days: 30 },
            reference_time(),
        )
        .expect("comparison computed");

    assert_eq!(report.cohort_size, 2);
    assert!(report.base_label.contains("30 days"));
}

#[test]
fn score_combines_configured_metrics() {
    let (service, _) = seeded_service();

    let result = service
        .score(
            &EvaluationId("subject".to_string()),
            ComparisonBase::AllOthers,
            reference_time(),
        )
        .expect("score computed");

    assert_eq!(result.comparison_count, 3);
    assert_eq!(result.valid_metric_count, 5);
    // 60*30 + 50*20 + 50*15 + 50*5 + 70*30 over a total weight of 100
    assert_eq!(result.total_score, Some(59));
    assert_eq!(result.recommendation.label(), "Worth considering");

    let condition = result
        .breakdown
        .iter()
        .find(|entry| entry.key == MetricKey::PhysicalAverage)
        .expect("condition scored");
    let score = condition.outcome.score().expect("scored");
    assert!((score - 70.0).abs() < 1e-9);
}

#[test]
fn score_without_other_evaluations_is_not_comparable() {
    let (service, _) = build_service();
    let record = service
        .create(
            OwnerId("solo-owner".to_string()),
            draft(40.0, 1_900_000.0, 2_100.0, 3),
        )
        .expect("stored");

    let result = service
        .score(&record.id, ComparisonBase::AllOthers, reference_time())
        .expect("score computed");

    assert_eq!(result.total_score, None);
    assert!(matches!(
        result.recommendation,
        Recommendation::ComparisonNotPossible { .. }
    ));
    assert!(result
        .breakdown
        .iter()
        .all(|entry| entry.outcome == MetricScore::NoComparisonData));
}

#[test]
fn finalizing_a_draft_adds_it_to_cohorts() {
    let (service, repository) = seeded_service();
    let subject = EvaluationId("subject".to_string());

    let before = service
        .compare(&subject, ComparisonBase::AllOthers, reference_time())
        .expect("comparison computed");
    let finalized = service
        .finalize(&EvaluationId("draft".to_string()))
        .expect("draft finalized");
    let after = service
        .compare(&subject, ComparisonBase::AllOthers, reference_time())
        .expect("comparison computed");

    assert!(!finalized.is_draft);
    assert_eq!(before.cohort_size + 1, after.cohort_size);
    assert!(!repository
        .fetch(&EvaluationId("draft".to_string()))
        .unwrap()
        .expect("draft stored")
        .is_draft);
}

#[test]
fn comparisons_do_not_modify_stored_records() {
    let (service, repository) = seeded_service();
    let before = repository.list_by_owner(&owner()).unwrap();

    service
        .score(
            &EvaluationId("subject".to_string()),
            ComparisonBase::SimilarPrice {
                tolerance_pct: 20.0,
            },
            reference_time(),
        )
        .expect("score computed");

    let after = repository.list_by_owner(&owner()).unwrap();
    assert_eq!(before, after);
    assert!(after
        .iter()
        .all(|record| record.figures.fee_per_sqm.is_none()));
}

#[test]
fn unknown_ids_surface_not_found() {
    let (service, _) = seeded_service();

    match service.get(&EvaluationId("missing".to_string())) {
        Err(EvaluationServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}
