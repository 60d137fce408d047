use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

/// Owner of an evaluation. Cohorts are always drawn from a single owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

/// One user-authored assessment of a single apartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: EvaluationId,
    pub owner: OwnerId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(flatten)]
    pub figures: ApartmentFigures,
    #[serde(default)]
    pub ratings: PhysicalRatings,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Quantitative listing and association figures. Every value is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApartmentFigures {
    #[serde(default)]
    pub floor_area: Option<f64>,
    #[serde(default)]
    pub asking_price: Option<f64>,
    #[serde(default)]
    pub final_price: Option<f64>,
    #[serde(default)]
    pub monthly_fee: Option<f64>,
    /// Pre-stored fee per square meter; wins over `monthly_fee / floor_area`.
    #[serde(default)]
    pub fee_per_sqm: Option<f64>,
    #[serde(default)]
    pub rooms: Option<String>,
    #[serde(default)]
    pub debt_per_sqm: Option<f64>,
    #[serde(default)]
    pub cashflow_per_sqm: Option<f64>,
}

/// Eight independent 1-5 condition ratings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalRatings {
    #[serde(default)]
    pub layout: Option<RatedAspect>,
    #[serde(default)]
    pub kitchen: Option<RatedAspect>,
    #[serde(default)]
    pub bathroom: Option<RatedAspect>,
    #[serde(default)]
    pub bedrooms: Option<RatedAspect>,
    #[serde(default)]
    pub surfaces: Option<RatedAspect>,
    #[serde(default)]
    pub storage: Option<RatedAspect>,
    #[serde(default)]
    pub light: Option<RatedAspect>,
    #[serde(default)]
    pub balcony: Option<RatedAspect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatedAspect {
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl RatedAspect {
    pub fn new(rating: u8) -> Self {
        Self {
            rating,
            comment: None,
        }
    }

    pub fn with_comment(rating: u8, comment: impl Into<String>) -> Self {
        Self {
            rating,
            comment: Some(comment.into()),
        }
    }
}

/// Rated physical aspects of an apartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalAspect {
    Layout,
    Kitchen,
    Bathroom,
    Bedrooms,
    Surfaces,
    Storage,
    Light,
    Balcony,
}

impl PhysicalAspect {
    pub const ALL: [PhysicalAspect; 8] = [
        PhysicalAspect::Layout,
        PhysicalAspect::Kitchen,
        PhysicalAspect::Bathroom,
        PhysicalAspect::Bedrooms,
        PhysicalAspect::Surfaces,
        PhysicalAspect::Storage,
        PhysicalAspect::Light,
        PhysicalAspect::Balcony,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PhysicalAspect::Layout => "Layout",
            PhysicalAspect::Kitchen => "Kitchen",
            PhysicalAspect::Bathroom => "Bathroom",
            PhysicalAspect::Bedrooms => "Bedrooms",
            PhysicalAspect::Surfaces => "Surface condition",
            PhysicalAspect::Storage => "Storage",
            PhysicalAspect::Light => "Natural light",
            PhysicalAspect::Balcony => "Balcony / outdoor space",
        }
    }
}

impl PhysicalRatings {
    pub fn get(&self, aspect: PhysicalAspect) -> Option<&RatedAspect> {
        match aspect {
            PhysicalAspect::Layout => self.layout.as_ref(),
            PhysicalAspect::Kitchen => self.kitchen.as_ref(),
            PhysicalAspect::Bathroom => self.bathroom.as_ref(),
            PhysicalAspect::Bedrooms => self.bedrooms.as_ref(),
            PhysicalAspect::Surfaces => self.surfaces.as_ref(),
            PhysicalAspect::Storage => self.storage.as_ref(),
            PhysicalAspect::Light => self.light.as_ref(),
            PhysicalAspect::Balcony => self.balcony.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, aspect: PhysicalAspect) -> &mut Option<RatedAspect> {
        match aspect {
            PhysicalAspect::Layout => &mut self.layout,
            PhysicalAspect::Kitchen => &mut self.kitchen,
            PhysicalAspect::Bathroom => &mut self.bathroom,
            PhysicalAspect::Bedrooms => &mut self.bedrooms,
            PhysicalAspect::Surfaces => &mut self.surfaces,
            PhysicalAspect::Storage => &mut self.storage,
            PhysicalAspect::Light => &mut self.light,
            PhysicalAspect::Balcony => &mut self.balcony,
        }
    }

    /// Ratings that are present, paired with their aspect.
    pub fn present(&self) -> impl Iterator<Item = (PhysicalAspect, u8)> + '_ {
        PhysicalAspect::ALL
            .into_iter()
            .filter_map(move |aspect| self.get(aspect).map(|rated| (aspect, rated.rating)))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (aspect, rating) in self.present() {
            if !(1..=5).contains(&rating) {
                return Err(ValidationError::RatingOutOfRange { aspect, rating });
            }
        }
        Ok(())
    }
}

/// Create payload for a new evaluation; identity is assigned on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDraft {
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(flatten)]
    pub figures: ApartmentFigures,
    #[serde(default)]
    pub ratings: PhysicalRatings,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EvaluationDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ratings.validate()?;

        let figures = &self.figures;
        let non_negative = [
            ("floor_area", figures.floor_area),
            ("asking_price", figures.asking_price),
            ("final_price", figures.final_price),
            ("monthly_fee", figures.monthly_fee),
            ("fee_per_sqm", figures.fee_per_sqm),
        ];
        for (field, value) in non_negative {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(ValidationError::InvalidAmount { field, value });
                }
            }
        }

        Ok(())
    }

    pub fn into_record(
        self,
        id: EvaluationId,
        owner: OwnerId,
        created_at: DateTime<Utc>,
    ) -> EvaluationRecord {
        EvaluationRecord {
            id,
            owner,
            created_at,
            is_draft: self.is_draft,
            address: self.address,
            figures: self.figures,
            ratings: self.ratings,
            notes: self.notes,
        }
    }
}

/// Rejection raised when a draft cannot become a stored evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{} rating must be between 1 and 5, got {rating}", aspect.label())]
    RatingOutOfRange { aspect: PhysicalAspect, rating: u8 },
    #[error("{field} must be a non-negative number, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },
}
