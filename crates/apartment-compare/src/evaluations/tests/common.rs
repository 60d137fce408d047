use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::evaluations::domain::{
    ApartmentFigures, EvaluationDraft, EvaluationId, EvaluationRecord, OwnerId, PhysicalRatings,
    RatedAspect,
};
use crate::evaluations::repository::{EvaluationRepository, RepositoryError};
use crate::evaluations::{evaluation_router, EvaluationService};
use crate::scoring::ScoringConfig;

pub(super) fn owner() -> OwnerId {
    OwnerId("owner-lena".to_string())
}

pub(super) fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 15, 10, 0, 0).unwrap()
}

pub(super) fn draft(area: f64, price: f64, fee: f64, condition: u8) -> EvaluationDraft {
    EvaluationDraft {
        is_draft: false,
        address: Some("Storgatan 12".to_string()),
        figures: ApartmentFigures {
            floor_area: Some(area),
            asking_price: Some(price),
            monthly_fee: Some(fee),
            rooms: Some("2 rok".to_string()),
            debt_per_sqm: Some(5_000.0),
            cashflow_per_sqm: Some(150.0),
            ..ApartmentFigures::default()
        },
        ratings: PhysicalRatings {
            layout: Some(RatedAspect::new(condition)),
            kitchen: Some(RatedAspect::with_comment(condition, "renovated 2019")),
            bathroom: Some(RatedAspect::new(condition)),
            light: Some(RatedAspect::new(condition)),
            ..PhysicalRatings::default()
        },
        notes: None,
    }
}

pub(super) fn stored(id: &str, days_ago: i64, draft: EvaluationDraft) -> EvaluationRecord {
    draft.into_record(
        EvaluationId(id.to_string()),
        owner(),
        reference_time() - Duration::days(days_ago),
    )
}

/// Subject plus three finalized neighbours and one draft.
pub(super) fn seeded_records() -> Vec<EvaluationRecord> {
    let mut in_progress = stored("draft", 1, draft(70.0, 1_000_000.0, 1_000.0, 5));
    in_progress.is_draft = true;

    vec![
        stored("subject", 2, draft(60.0, 2_700_000.0, 3_000.0, 4)),
        stored("cheap", 10, draft(60.0, 2_400_000.0, 3_300.0, 3)),
        stored("mid", 20, draft(60.0, 3_000_000.0, 3_000.0, 3)),
        stored("pricey", 60, draft(60.0, 3_600_000.0, 2_700.0, 4)),
        in_progress,
    ]
}

pub(super) fn build_service() -> (EvaluationService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = EvaluationService::new(repository.clone(), ScoringConfig::standard());
    (service, repository)
}

pub(super) fn seeded_service() -> (EvaluationService<MemoryRepository>, Arc<MemoryRepository>) {
    let (service, repository) = build_service();
    for record in seeded_records() {
        repository.insert(record).expect("seed insert");
    }
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<EvaluationId, EvaluationRecord>>>,
}

impl EvaluationRepository for MemoryRepository {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: EvaluationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<EvaluationRecord> = guard
            .values()
            .filter(|record| &record.owner == owner)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn insert(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn update(&self, _record: EvaluationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn list_by_owner(&self, _owner: &OwnerId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: EvaluationService<MemoryRepository>) -> axum::Router {
    evaluation_router(Arc::new(service))
}
