use crate::infra::{end_of_day, InMemoryEvaluationRepository};
use apartment_compare::comparison::{CohortDefaults, ComparisonBase, MetricUnit};
use apartment_compare::error::AppError;
use apartment_compare::evaluations::{
    ComparisonReport, EvaluationCsvImporter, EvaluationId, EvaluationRecord,
    EvaluationRepository, EvaluationService, EvaluationServiceError, OwnerId,
};
use apartment_compare::scoring::{ScoringConfig, ScoringResult};
use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_OWNER: &str = "demo-buyer";
const DEMO_SUBJECT: &str = "birch-12";
const DEMO_REFERENCE_DATE: (i32, u32, u32) = (2025, 9, 30);

const DEMO_EVALUATIONS_CSV: &str = "\
id,created_at,is_draft,address,floor_area,asking_price,final_price,monthly_fee,rooms,debt_per_sqm,cashflow_per_sqm,layout,kitchen,bathroom,surfaces,light,balcony,notes
birch-12,2025-09-27,false,Birch Street 12,62,2850000,,3150,2.5,4200,55,4,4,3,4,5,4,Top floor with afternoon sun
harbor-4,2025-09-20,false,Harbor Road 4,58,2600000,2710000,3400,2,6800,20,3,3,3,3,4,,Fee raise announced for next year
elm-7,2025-09-11,false,Elm Court 7,71,3350000,,3550,3,3100,80,4,5,4,4,4,4,
mill-21,2025-08-14,false,Mill Lane 21,49,2290000,2240000,2700,2,5200,35,3,2,2,3,3,3,Bathroom needs renovation
canal-9,2025-07-02,false,Canal Quay 9,64,3150000,,2950,3,2500,95,5,4,4,5,4,5,
oak-3,2025-09-28,true,Oak Row 3,55,2480000,,3100,2,,,3,,,,,,Viewing notes not complete
";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Comparison base to demonstrate (all, recent, similar_price, similar_size). Shows every base when omitted.
    #[arg(long)]
    pub(crate) base: Option<String>,
    /// Reference date for the "recent" base (YYYY-MM-DD). Defaults to the demo data's reference date.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// CSV export of evaluations to load
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Id of the evaluation to score
    #[arg(long)]
    pub(crate) subject: String,
    /// Owner the imported evaluations are attributed to
    #[arg(long, default_value = "local")]
    pub(crate) owner: String,
    /// Comparison base (all, recent, similar_price, similar_size)
    #[arg(long, default_value = "all")]
    pub(crate) base: String,
    /// Window in days for the recent base
    #[arg(long)]
    pub(crate) days: Option<u32>,
    /// Tolerance in percent for the similar_price and similar_size bases
    #[arg(long)]
    pub(crate) tolerance: Option<f64>,
    /// Scoring config JSON document (defaults to the built-in weights)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Reference date for the recent base (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print the scoring result as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        csv,
        subject,
        owner,
        base,
        days,
        tolerance,
        config,
        as_of,
        json,
    } = args;

    let as_of = end_of_day(as_of.unwrap_or_else(|| Local::now().date_naive()));
    let scoring_config = match config {
        Some(path) => ScoringConfig::from_path(path)?,
        None => ScoringConfig::standard(),
    };
    let defaults = CohortDefaults::default();
    let base = ComparisonBase::from_query(
        &base,
        days.unwrap_or(defaults.recent_days),
        tolerance.unwrap_or(defaults.similar_tolerance_pct),
    )?;

    let owner = OwnerId(owner);
    let records = EvaluationCsvImporter::from_path(csv, &owner, as_of)?;
    let service = service_with_records(records, scoring_config)?;

    let subject = EvaluationId(subject);
    let report = service.compare(&subject, base, as_of)?;
    let result = service.score(&subject, base, as_of)?;

    if json {
        println!("{}", to_json(&result)?);
        return Ok(());
    }

    println!("Evaluation {}", subject.0);
    render_comparison(&report);
    render_score(&result);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { base, as_of } = args;

    let reference = as_of.unwrap_or_else(demo_reference_date);
    let as_of = end_of_day(reference);
    let owner = OwnerId(DEMO_OWNER.to_string());
    let records = demo_records(&owner, as_of)?;
    let evaluated = records.iter().filter(|record| !record.is_draft).count();

    println!("Apartment comparison demo");
    println!(
        "- {} evaluations loaded for {} ({} finalized, {} draft)",
        records.len(),
        owner.0,
        evaluated,
        records.len() - evaluated
    );

    let service = service_with_records(records, ScoringConfig::standard())?;
    let subject = EvaluationId(DEMO_SUBJECT.to_string());
    let defaults = service.cohort_defaults();

    let bases = match base {
        Some(name) => vec![ComparisonBase::from_query(
            &name,
            defaults.recent_days,
            defaults.similar_tolerance_pct,
        )?],
        None => vec![
            ComparisonBase::AllOthers,
            ComparisonBase::Recent {
                days: defaults.recent_days,
            },
            ComparisonBase::SimilarPrice {
                tolerance_pct: defaults.similar_tolerance_pct,
            },
            ComparisonBase::SimilarSize {
                tolerance_pct: defaults.similar_tolerance_pct,
            },
        ],
    };

    for base in bases {
        println!();
        let report = service.compare(&subject, base, as_of)?;
        let result = service.score(&subject, base, as_of)?;
        render_comparison(&report);
        render_score(&result);
    }

    Ok(())
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|err| AppError::Io(std::io::Error::from(err)))
}

fn demo_reference_date() -> NaiveDate {
    let (year, month, day) = DEMO_REFERENCE_DATE;
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) fn demo_records(
    owner: &OwnerId,
    imported_at: DateTime<Utc>,
) -> Result<Vec<EvaluationRecord>, AppError> {
    let reader = Cursor::new(DEMO_EVALUATIONS_CSV.as_bytes());
    Ok(EvaluationCsvImporter::from_reader(
        reader,
        owner,
        imported_at,
    )?)
}

pub(crate) fn service_with_records(
    records: Vec<EvaluationRecord>,
    config: ScoringConfig,
) -> Result<EvaluationService<InMemoryEvaluationRepository>, AppError> {
    let repository = Arc::new(InMemoryEvaluationRepository::default());
    for record in records {
        repository
            .insert(record)
            .map_err(|err| AppError::from(EvaluationServiceError::from(err)))?;
    }
    Ok(EvaluationService::new(repository, config))
}

pub(crate) fn render_comparison(report: &ComparisonReport) {
    println!(
        "Compared against {} ({} evaluations)",
        report.base_label, report.cohort_size
    );
    if report.metrics.is_empty() {
        println!("- No comparable metrics");
        return;
    }

    for metric in &report.metrics {
        println!(
            "- {}: {} vs avg {} | best {} | worst {} | beats {}/{} ({:.0}th percentile)",
            metric.name,
            format_value(metric.subject_value, metric.unit),
            format_value(metric.average, metric.unit),
            format_value(metric.best, metric.unit),
            format_value(metric.worst, metric.unit),
            metric.better_count,
            metric.total,
            metric.effective_percentile()
        );
    }
}

pub(crate) fn render_score(result: &ScoringResult) {
    match result.total_score {
        Some(score) => println!(
            "Score {}/100 -> {}",
            score,
            result.recommendation.label()
        ),
        None => println!("Score n/a -> {}", result.recommendation.label()),
    }
    println!(
        "  {} of {} metrics scored | weight applied {:.0} of {:.0}",
        result.valid_metric_count,
        result.breakdown.len(),
        result.applied_weight,
        result.total_weight
    );

    for entry in &result.breakdown {
        match entry.outcome.score() {
            Some(score) => println!(
                "  - {} (weight {:.0}): {:.0} ({})",
                entry.name,
                entry.weight,
                score,
                entry.outcome.note()
            ),
            None => println!(
                "  - {} (weight {:.0}): {}",
                entry.name,
                entry.weight,
                entry.outcome.note()
            ),
        }
    }
}

fn format_value(value: f64, unit: MetricUnit) -> String {
    match unit {
        MetricUnit::Currency => format!("{value:.0}"),
        MetricUnit::CurrencyPerMonth => format!("{value:.0}/month"),
        MetricUnit::CurrencyPerSqm => format!("{value:.0}/m2"),
        MetricUnit::SquareMeters => format!("{value:.1} m2"),
        MetricUnit::Rating => format!("{value:.1}/5"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apartment_compare::evaluations::MetricKey;

    fn demo_service() -> EvaluationService<InMemoryEvaluationRepository> {
        let owner = OwnerId(DEMO_OWNER.to_string());
        let records = demo_records(&owner, end_of_day(demo_reference_date())).expect("demo csv");
        service_with_records(records, ScoringConfig::standard()).expect("service")
    }

    #[test]
    fn demo_data_imports_every_row() {
        let owner = OwnerId(DEMO_OWNER.to_string());
        let records = demo_records(&owner, end_of_day(demo_reference_date())).expect("demo csv");

        assert_eq!(records.len(), 6);
        assert_eq!(records.iter().filter(|record| record.is_draft).count(), 1);
        assert!(records.iter().all(|record| record.owner == owner));
    }

    #[test]
    fn demo_subject_scores_against_finalized_evaluations() {
        let service = demo_service();
        let as_of = end_of_day(demo_reference_date());
        let subject = EvaluationId(DEMO_SUBJECT.to_string());

        let result = service
            .score(&subject, ComparisonBase::AllOthers, as_of)
            .expect("scores");

        assert_eq!(result.comparison_count, 4);
        assert_eq!(result.valid_metric_count, 5);
        assert!(result.total_score.is_some());
    }

    #[test]
    fn recent_base_narrows_the_demo_cohort() {
        let service = demo_service();
        let as_of = end_of_day(demo_reference_date());
        let subject = EvaluationId(DEMO_SUBJECT.to_string());

        let report = service
            .compare(&subject, ComparisonBase::Recent { days: 30 }, as_of)
            .expect("compares");

        assert_eq!(report.cohort_size, 2);
        let price = report
            .metrics
            .iter()
            .find(|metric| metric.key == MetricKey::Price)
            .expect("price ranked");
        assert_eq!(price.total, 2);
    }

    #[test]
    fn run_demo_accepts_named_base() {
        let args = DemoArgs {
            base: Some("similar_size".to_string()),
            as_of: None,
        };
        run_demo(args).expect("demo runs");
    }

    #[test]
    fn run_demo_rejects_unknown_base() {
        let args = DemoArgs {
            base: Some("cheapest".to_string()),
            as_of: None,
        };
        let err = run_demo(args).expect_err("unknown base");
        assert!(matches!(err, AppError::Comparison(_)));
    }

    #[test]
    fn json_output_failures_become_errors() {
        let mut keyed_by_pair = std::collections::HashMap::new();
        keyed_by_pair.insert((1u8, 2u8), "non-string map key");

        let err = to_json(&keyed_by_pair).expect_err("map keys must be strings");
        assert!(matches!(err, AppError::Io(_)));

        let service = demo_service();
        let result = service
            .score(
                &EvaluationId(DEMO_SUBJECT.to_string()),
                ComparisonBase::AllOthers,
                end_of_day(demo_reference_date()),
            )
            .expect("scores");
        let payload = to_json(&result).expect("scoring result serializes");
        assert!(payload.contains("\"breakdown\""));
    }

    #[test]
    fn run_score_reports_unknown_subject() {
        let path = std::env::temp_dir().join(format!(
            "apartment-compare-score-{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, DEMO_EVALUATIONS_CSV).expect("write csv");

        let args = ScoreArgs {
            csv: path.clone(),
            subject: "no-such-apartment".to_string(),
            owner: "local".to_string(),
            base: "all".to_string(),
            days: None,
            tolerance: None,
            config: None,
            as_of: Some(demo_reference_date()),
            json: false,
        };
        let err = run_score(args).expect_err("missing subject");
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, AppError::Evaluation(_)));
    }
}
