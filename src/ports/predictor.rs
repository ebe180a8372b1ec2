//! Predictor port: Trait for the external prediction service.
//!
//! The service is opaque to the client: it receives one clinical record and
//! answers with a binary prediction and a probability percentage.

use crate::domain::{AssessmentResult, ClinicalRecord};

/// Error type for prediction requests.
///
/// The `Display` text is what the user sees when an assessment fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictorError {
    /// The service could not be reached (connection refused, DNS, timeout).
    #[error("Unable to reach the prediction service: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Server error: {status_text}{}", detail_suffix(.detail))]
    Service {
        status: u16,
        status_text: String,
        detail: Option<String>,
    },

    /// The response body could not be read as a prediction.
    #[error("Malformed prediction response: {0}")]
    MalformedResponse(String),
}

/// Trait for prediction backends.
///
/// Implementations may block; callers that must stay responsive run them on
/// a worker thread.
pub trait Predictor: Send + Sync {
    /// Request a prediction for `record`.
    ///
    /// The returned probability is trusted as already within `[0, 100]`.
    ///
    /// # Errors
    /// Returns `PredictorError` on transport failure, non-success status, or
    /// an unreadable response.
    fn predict(&self, record: &ClinicalRecord) -> Result<AssessmentResult, PredictorError>;
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_text() {
        let err = PredictorError::Service {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            detail: None,
        };
        assert_eq!(err.to_string(), "Server error: Internal Server Error");

        let err = PredictorError::Service {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            detail: Some("model not loaded".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Server error: Internal Server Error (model not loaded)"
        );
    }
}
