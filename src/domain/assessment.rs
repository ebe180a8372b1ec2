//! Assessment result types.
//!
//! Represents the output of the external heart disease prediction service.

use serde::{Deserialize, Serialize};

use super::record::ClinicalRecord;
use super::risk::{classify, RiskClassification};

/// Binary model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Prediction {
    /// No disease predicted (0)
    Absent,
    /// Disease predicted (1)
    Present,
}

impl Prediction {
    /// Headline shown above the result.
    #[must_use]
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Present => "High Risk Detected",
            Self::Absent => "Low Risk Detected",
        }
    }

    /// Explanatory sentence under the headline.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Present => {
                "Model suggests high probability of cardiovascular anomaly. Immediate medical consultation recommended."
            }
            Self::Absent => {
                "Model indicates low probability of cardiovascular disease based on provided metrics."
            }
        }
    }
}

impl From<Prediction> for u8 {
    fn from(value: Prediction) -> u8 {
        match value {
            Prediction::Absent => 0,
            Prediction::Present => 1,
        }
    }
}

impl TryFrom<u8> for Prediction {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Absent),
            1 => Ok(Self::Present),
            other => Err(format!("prediction must be 0 or 1, got {other}")),
        }
    }
}

/// Result returned by the prediction service.
///
/// Immutable once received; replaced on the next submission, dropped on reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub prediction: Prediction,

    /// Disease probability in percent (0.0 to 100.0)
    pub probability: f64,
}

impl AssessmentResult {
    /// Create a new assessment result.
    #[must_use]
    pub fn new(prediction: Prediction, probability: f64) -> Self {
        Self {
            prediction,
            probability,
        }
    }

    /// Category, color and gauge angle for this result.
    #[must_use]
    pub fn classification(&self) -> RiskClassification {
        classify(self.probability)
    }
}

/// Downloadable artifact: the submitted form and its result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentExport {
    /// Unique identifier of this export
    pub id: String,

    pub form_data: ClinicalRecord,

    pub result: AssessmentResult,

    pub exported_at: chrono::DateTime<chrono::Utc>,
}

impl AssessmentExport {
    /// Snapshot a record and its result for export.
    #[must_use]
    pub fn new(form_data: ClinicalRecord, result: AssessmentResult) -> Self {
        Self {
            id: uuid_v4(),
            form_data,
            result,
            exported_at: chrono::Utc::now(),
        }
    }
}

/// Generate a UUID v4 string from a ChaCha20 CSPRNG seeded from OS entropy.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLevel;

    #[test]
    fn test_result_deserializes_service_response() {
        let json = r#"{"prediction": 1, "probability": 85.0, "features_used": ["age"]}"#;
        let result: AssessmentResult = serde_json::from_str(json).expect("Should parse");
        assert_eq!(result.prediction, Prediction::Present);
        assert!((result.probability - 85.0).abs() < f64::EPSILON);
        assert_eq!(result.classification().category, RiskLevel::High);
    }

    #[test]
    fn test_result_rejects_bad_prediction_code() {
        let json = r#"{"prediction": 2, "probability": 85.0}"#;
        assert!(serde_json::from_str::<AssessmentResult>(json).is_err());

        let json = r#"{"probability": 85.0}"#;
        assert!(serde_json::from_str::<AssessmentResult>(json).is_err());
    }

    #[test]
    fn test_headline_follows_prediction() {
        assert_eq!(Prediction::Present.headline(), "High Risk Detected");
        assert_eq!(Prediction::Absent.headline(), "Low Risk Detected");
    }

    #[test]
    fn test_export_shape() {
        let export = AssessmentExport::new(
            ClinicalRecord::default(),
            AssessmentResult::new(Prediction::Present, 85.0),
        );
        let json = serde_json::to_value(&export).expect("Should serialize");

        assert_eq!(json["formData"]["BP"], 180);
        assert_eq!(json["result"]["prediction"], 1);
        assert_eq!(json["result"]["probability"], 85.0);
        assert!(json["exportedAt"].is_string());
        assert_eq!(export.id.len(), 36);
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
    }
}
