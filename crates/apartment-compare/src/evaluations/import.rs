use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{
    ApartmentFigures, EvaluationDraft, EvaluationId, EvaluationRecord, OwnerId, PhysicalAspect,
    PhysicalRatings, RatedAspect, ValidationError,
};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Invalid {
        row: usize,
        source: ValidationError,
    },
    DuplicateId(EvaluationId),
    InvalidTimestamp {
        row: usize,
        value: String,
    },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read evaluation export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid evaluation CSV data: {}", err),
            ImportError::Invalid { row, source } => {
                write!(f, "row {} rejected: {}", row, source)
            }
            ImportError::DuplicateId(id) => {
                write!(f, "evaluation id '{}' appears more than once", id.0)
            }
            ImportError::InvalidTimestamp { row, value } => write!(
                f,
                "row {} rejected: created_at '{}' is neither RFC 3339 nor YYYY-MM-DD",
                row, value
            ),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Invalid { source, .. } => Some(source),
            ImportError::DuplicateId(_) | ImportError::InvalidTimestamp { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads evaluations for one owner from a CSV export.
///
/// Headers mirror the record fields; rating columns are named after the
/// aspect (`layout`, `kitchen`, ...). Blank cells are treated as missing.
pub struct EvaluationCsvImporter;

impl EvaluationCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        owner: &OwnerId,
        imported_at: DateTime<Utc>,
    ) -> Result<Vec<EvaluationRecord>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, owner, imported_at)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        owner: &OwnerId,
        imported_at: DateTime<Utc>,
    ) -> Result<Vec<EvaluationRecord>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for (index, row) in csv_reader.deserialize::<EvaluationRow>().enumerate() {
            let row = row?;
            let row_number = index + 1;

            let id = EvaluationId(
                row.id
                    .clone()
                    .unwrap_or_else(|| format!("row-{row_number}")),
            );
            if !seen.insert(id.clone()) {
                return Err(ImportError::DuplicateId(id));
            }

            let created_at = match row.created_at.as_deref() {
                None => imported_at,
                Some(raw) => {
                    parse_timestamp(raw).ok_or_else(|| ImportError::InvalidTimestamp {
                        row: row_number,
                        value: raw.to_string(),
                    })?
                }
            };

            let draft = row.into_draft();
            draft.validate().map_err(|source| ImportError::Invalid {
                row: row_number,
                source,
            })?;

            records.push(draft.into_record(id, owner.clone(), created_at));
        }

        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct EvaluationRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
    #[serde(default)]
    is_draft: Option<bool>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    address: Option<String>,
    #[serde(default)]
    floor_area: Option<f64>,
    #[serde(default)]
    asking_price: Option<f64>,
    #[serde(default)]
    final_price: Option<f64>,
    #[serde(default)]
    monthly_fee: Option<f64>,
    #[serde(default)]
    fee_per_sqm: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rooms: Option<String>,
    #[serde(default)]
    debt_per_sqm: Option<f64>,
    #[serde(default)]
    cashflow_per_sqm: Option<f64>,
    #[serde(default)]
    layout: Option<u8>,
    #[serde(default)]
    kitchen: Option<u8>,
    #[serde(default)]
    bathroom: Option<u8>,
    #[serde(default)]
    bedrooms: Option<u8>,
    #[serde(default)]
    surfaces: Option<u8>,
    #[serde(default)]
    storage: Option<u8>,
    #[serde(default)]
    light: Option<u8>,
    #[serde(default)]
    balcony: Option<u8>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    notes: Option<String>,
}

impl EvaluationRow {
    fn into_draft(self) -> EvaluationDraft {
        let mut ratings = PhysicalRatings::default();
        let columns = [
            (PhysicalAspect::Layout, self.layout),
            (PhysicalAspect::Kitchen, self.kitchen),
            (PhysicalAspect::Bathroom, self.bathroom),
            (PhysicalAspect::Bedrooms, self.bedrooms),
            (PhysicalAspect::Surfaces, self.surfaces),
            (PhysicalAspect::Storage, self.storage),
            (PhysicalAspect::Light, self.light),
            (PhysicalAspect::Balcony, self.balcony),
        ];
        for (aspect, rating) in columns {
            *ratings.slot_mut(aspect) = rating.map(RatedAspect::new);
        }

        EvaluationDraft {
            is_draft: self.is_draft.unwrap_or(false),
            address: self.address,
            figures: ApartmentFigures {
                floor_area: self.floor_area,
                asking_price: self.asking_price,
                final_price: self.final_price,
                monthly_fee: self.monthly_fee,
                fee_per_sqm: self.fee_per_sqm,
                rooms: self.rooms,
                debt_per_sqm: self.debt_per_sqm,
                cashflow_per_sqm: self.cashflow_per_sqm,
            },
            ratings,
            notes: self.notes,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
