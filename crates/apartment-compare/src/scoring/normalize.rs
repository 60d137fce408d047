use serde::{Deserialize, Serialize};

const NEUTRAL_SCORE: f64 = 50.0;

/// Maps a subject value onto 0-100 relative to the cohort average.
///
/// Exactly-average scores 50; each 50% deviation moves the score by 50 points
/// in the direction the metric favours. A zero average yields the neutral 50.
///
/// The score is ratio based, so a negative cohort average (possible for
/// `cashflow_per_sqm`) flips the direction: a subject at -50 against an
/// average of -100 scores below one at -150 on a higher-is-better metric.
pub fn normalized_score(subject_value: f64, cohort_average: f64, lower_is_better: bool) -> f64 {
    if cohort_average == 0.0 {
        return NEUTRAL_SCORE;
    }

    let ratio = subject_value / cohort_average;
    let score = if lower_is_better {
        100.0 - (ratio - 0.5) * 100.0
    } else {
        (ratio - 1.0) * 100.0 + 50.0
    };

    score.clamp(0.0, 100.0)
}

/// Qualitative reading of a normalized metric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    Excellent,
    VeryGood,
    Good,
    Acceptable,
    Average,
    BelowAverage,
    Poor,
}

impl Assessment {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 85.0 => Assessment::Excellent,
            s if s >= 75.0 => Assessment::VeryGood,
            s if s >= 65.0 => Assessment::Good,
            s if s >= 55.0 => Assessment::Acceptable,
            s if s >= 45.0 => Assessment::Average,
            s if s >= 35.0 => Assessment::BelowAverage,
            _ => Assessment::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Assessment::Excellent => "Excellent",
            Assessment::VeryGood => "Very good",
            Assessment::Good => "Good",
            Assessment::Acceptable => "Acceptable",
            Assessment::Average => "Average",
            Assessment::BelowAverage => "Below average",
            Assessment::Poor => "Poor",
        }
    }
}
