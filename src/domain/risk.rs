//! Risk classification of a predicted disease probability.
//!
//! Maps a probability percentage to a discrete category, its display color
//! and the needle angle on the semicircular gauge.

use serde::{Deserialize, Serialize};

/// Upper bound (inclusive) of the Low band, in percent.
pub const LOW_CEILING: f64 = 40.0;

/// Upper bound (inclusive) of the Moderate band, in percent.
pub const MODERATE_CEILING: f64 = 70.0;

/// Sweep of the gauge, leftmost (0%) to rightmost (100%).
pub const GAUGE_SWEEP_DEGREES: f64 = 180.0;

/// Risk level classification for heart disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Low risk of heart disease
    Low,
    /// Moderate risk, monitoring recommended
    Moderate,
    /// High risk, intervention recommended
    High,
}

impl RiskLevel {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - No significant indicators",
            Self::Moderate => "Moderate risk - Follow-up recommended",
            Self::High => "High risk - Immediate consultation advised",
        }
    }

    /// Color used for this level everywhere in the presentation.
    #[must_use]
    pub fn color(&self) -> RiskColor {
        match self {
            Self::Low => RiskColor::Emerald,
            Self::Moderate => RiskColor::Amber,
            Self::High => RiskColor::Red,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Color encoding of a risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskColor {
    Emerald,
    Amber,
    Red,
}

impl RiskColor {
    /// RGB triple for terminal display.
    #[must_use]
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Emerald => (16, 185, 129), // #10B981
            Self::Amber => (245, 158, 11),   // #F59E0B
            Self::Red => (239, 68, 68),      // #EF4444
        }
    }

    /// Hex notation, e.g. for reports.
    #[must_use]
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Emerald => "#10B981",
            Self::Amber => "#F59E0B",
            Self::Red => "#EF4444",
        }
    }
}

impl std::fmt::Display for RiskColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Emerald => write!(f, "emerald"),
            Self::Amber => write!(f, "amber"),
            Self::Red => write!(f, "red"),
        }
    }
}

/// Everything the presentation derives from one probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskClassification {
    pub category: RiskLevel,
    pub color: RiskColor,
    /// Needle angle: 0 = leftmost (0%), 180 = rightmost (100%).
    pub gauge_angle_degrees: f64,
}

/// Classify a probability percentage.
///
/// Bands are half-open so that each boundary belongs to exactly one band:
/// `p <= 40` is Low, `40 < p <= 70` is Moderate, `p > 70` is High.
#[must_use]
pub fn classify(probability: f64) -> RiskClassification {
    let category = if probability <= LOW_CEILING {
        RiskLevel::Low
    } else if probability <= MODERATE_CEILING {
        RiskLevel::Moderate
    } else {
        RiskLevel::High
    };

    RiskClassification {
        category,
        color: category.color(),
        gauge_angle_degrees: probability / 100.0 * GAUGE_SWEEP_DEGREES,
    }
}

/// One row of the category chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskBand {
    pub level: RiskLevel,
    pub name: &'static str,
    pub range: &'static str,
}

impl RiskBand {
    /// Whether `probability` falls in this band.
    #[must_use]
    pub fn contains(&self, probability: f64) -> bool {
        classify(probability).category == self.level
    }
}

/// Category chart rows, lowest first.
pub const RISK_BANDS: [RiskBand; 3] = [
    RiskBand {
        level: RiskLevel::Low,
        name: "Low Risk",
        range: "0-40%",
    },
    RiskBand {
        level: RiskLevel::Moderate,
        name: "Moderate Risk",
        range: "40-70%",
    },
    RiskBand {
        level: RiskLevel::High,
        name: "High Risk",
        range: "70-100%",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(classify(0.0).category, RiskLevel::Low);
        assert_eq!(classify(40.0).category, RiskLevel::Low);
        assert_eq!(classify(40.0001).category, RiskLevel::Moderate);
        assert_eq!(classify(70.0).category, RiskLevel::Moderate);
        assert_eq!(classify(70.0001).category, RiskLevel::High);
        assert_eq!(classify(100.0).category, RiskLevel::High);
    }

    #[test]
    fn test_gauge_angle() {
        assert!((classify(0.0).gauge_angle_degrees - 0.0).abs() < 1e-9);
        assert!((classify(50.0).gauge_angle_degrees - 90.0).abs() < 1e-9);
        assert!((classify(100.0).gauge_angle_degrees - 180.0).abs() < 1e-9);
        assert!((classify(85.0).gauge_angle_degrees - 153.0).abs() < 1e-9);
    }

    #[test]
    fn test_color_follows_category() {
        assert_eq!(classify(10.0).color, RiskColor::Emerald);
        assert_eq!(classify(55.0).color, RiskColor::Amber);
        assert_eq!(classify(85.0).color, RiskColor::Red);
    }

    #[test]
    fn test_exactly_one_band_is_active() {
        for p in [0.0, 39.9, 40.0, 40.0001, 69.99, 70.0, 70.0001, 100.0] {
            let active = RISK_BANDS.iter().filter(|b| b.contains(p)).count();
            assert_eq!(active, 1, "probability {p} matched {active} bands");
        }
    }
}
