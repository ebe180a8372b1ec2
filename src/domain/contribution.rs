//! Display-only risk contribution scores.
//!
//! These are client-side visual heuristics for the advanced analysis chart,
//! not model feature importances. Each score is a min-max normalization to a
//! percentage, capped at a per-feature display ceiling.
//!
//! Values below a feature's nominal floor come out negative; the renderer
//! clamps bar widths to `[0, 100]`, this module does not.

use super::record::ClinicalRecord;

const AGE_CEILING: f64 = 80.0;
const BP_CEILING: f64 = 90.0;
const CHOLESTEROL_CEILING: f64 = 85.0;
const MAX_HR_CEILING: f64 = 75.0;
const ST_DEPRESSION_CEILING: f64 = 95.0;

const BP_RANGE: (f64, f64) = (80.0, 250.0);
const CHOLESTEROL_RANGE: (f64, f64) = (100.0, 400.0);
const MAX_HR_RANGE: (f64, f64) = (60.0, 220.0);
const ST_DEPRESSION_MAX: f64 = 6.0;

fn scaled(value: f64, (lo, hi): (f64, f64)) -> f64 {
    (value - lo) / (hi - lo) * 100.0
}

/// Age score: `min(80, age)`; ages of 100 and over saturate at the ceiling.
#[must_use]
pub fn age_score(age: f64) -> f64 {
    (age / 100.0 * 100.0).min(AGE_CEILING)
}

/// Resting blood pressure score over 80-250 mmHg.
#[must_use]
pub fn blood_pressure_score(resting_bp: f64) -> f64 {
    scaled(resting_bp, BP_RANGE).min(BP_CEILING)
}

/// Cholesterol score over 100-400 mg/dL.
#[must_use]
pub fn cholesterol_score(cholesterol: f64) -> f64 {
    scaled(cholesterol, CHOLESTEROL_RANGE).min(CHOLESTEROL_CEILING)
}

/// Inverted max heart rate score: a lower peak rate scores higher.
#[must_use]
pub fn max_heart_rate_score(max_heart_rate: f64) -> f64 {
    (100.0 - scaled(max_heart_rate, MAX_HR_RANGE)).min(MAX_HR_CEILING)
}

/// ST depression score over 0-6 mm.
#[must_use]
pub fn st_depression_score(st_depression: f64) -> f64 {
    (st_depression / ST_DEPRESSION_MAX * 100.0).min(ST_DEPRESSION_CEILING)
}

/// Clamp a score to a drawable bar width.
#[must_use]
pub fn bar_width(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

/// The five contribution scores for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskContributions {
    pub age: f64,
    pub blood_pressure: f64,
    pub cholesterol: f64,
    pub max_heart_rate: f64,
    pub st_depression: f64,
}

impl RiskContributions {
    /// Compute the scores from the current record.
    #[must_use]
    pub fn from_record(record: &ClinicalRecord) -> Self {
        Self {
            age: age_score(f64::from(record.age)),
            blood_pressure: blood_pressure_score(f64::from(record.resting_bp)),
            cholesterol: cholesterol_score(f64::from(record.cholesterol)),
            max_heart_rate: max_heart_rate_score(f64::from(record.max_heart_rate)),
            st_depression: st_depression_score(record.st_depression),
        }
    }

    /// `(chart label, score)` pairs in chart order.
    #[must_use]
    pub fn labelled(&self) -> [(&'static str, f64); 5] {
        [
            ("Age", self.age),
            ("BP", self.blood_pressure),
            ("Cholesterol", self.cholesterol),
            ("Max HR", self.max_heart_rate),
            ("ST Depression", self.st_depression),
        ]
    }
}
