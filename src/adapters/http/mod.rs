//! HTTP adapter: Implementation of Predictor over the service's JSON API.
//!
//! Endpoints:
//! - `POST /predict` with the record keyed by wire names, answering
//!   `{"prediction": 0|1, "probability": <percent>}`
//! - `GET /` answering a status document
//!
//! The response body is trusted beyond its shape: extra keys are ignored and
//! the probability is not re-clamped.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use crate::domain::{AssessmentResult, ClinicalRecord};
use crate::ports::{Predictor, PredictorError};

/// Default service location, matching the reference deployment.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Status document served at `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub expected_features: Vec<String>,
}

/// Error body the service sends alongside a failing status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Blocking HTTP client for the prediction service.
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    client: Client,
    base_url: String,
}

impl HttpPredictor {
    /// Create a client for the service at `base_url`.
    ///
    /// # Errors
    /// Returns `PredictorError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PredictorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PredictorError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetch the service status document.
    ///
    /// # Errors
    /// Same failure modes as [`Predictor::predict`].
    pub fn status(&self) -> Result<ServiceStatus, PredictorError> {
        let response = self
            .client
            .get(self.endpoint("/"))
            .send()
            .map_err(transport_error)?;

        read_json(response)
    }
}

impl Predictor for HttpPredictor {
    fn predict(&self, record: &ClinicalRecord) -> Result<AssessmentResult, PredictorError> {
        tracing::debug!(
            "POST {} (record {})",
            self.endpoint("/predict"),
            record.fingerprint()
        );

        let response = self
            .client
            .post(self.endpoint("/predict"))
            .json(record)
            .send()
            .map_err(transport_error)?;

        read_json(response)
    }
}

fn transport_error(e: reqwest::Error) -> PredictorError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "connection failed".to_string()
    } else {
        e.to_string()
    };
    PredictorError::Transport(reason)
}

/// Turn a response into `T`, mapping non-2xx statuses and unreadable bodies.
fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, PredictorError> {
    let status = response.status();

    if !status.is_success() {
        // The body is informational only; an unreadable one still yields the status error.
        let detail = response
            .text()
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .map(|body| body.error);

        return Err(PredictorError::Service {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string(),
            detail,
        });
    }

    let body = response.text().map_err(transport_error)?;
    serde_json::from_str(&body).map_err(|e| PredictorError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Prediction;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn predict_blocking(
        base_url: String,
    ) -> tokio::task::JoinHandle<Result<AssessmentResult, PredictorError>> {
        tokio::task::spawn_blocking(move || {
            let predictor =
                HttpPredictor::new(base_url, Duration::from_secs(5)).expect("Should build client");
            predictor.predict(&ClinicalRecord::default())
        })
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_predict_success_sends_wire_record() {
        let server = MockServer::start().await;
        let expected_body =
            serde_json::to_value(ClinicalRecord::default()).expect("Should serialize");

        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_json(expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "prediction": 1,
                "probability": 85.0,
                "features_used": ["age", "sex"],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = predict_blocking(server.uri())
            .await
            .expect("Should join")
            .expect("Should predict");

        assert_eq!(result.prediction, Prediction::Present);
        assert!((result.probability - 85.0).abs() < f64::EPSILON);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_predict_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "model not loaded"})),
            )
            .mount(&server)
            .await;

        let err = predict_blocking(server.uri())
            .await
            .expect("Should join")
            .expect_err("Should fail");

        assert_eq!(
            err,
            PredictorError::Service {
                status: 500,
                status_text: "Internal Server Error".to_string(),
                detail: Some("model not loaded".to_string()),
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_predict_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = predict_blocking(server.uri())
            .await
            .expect("Should join")
            .expect_err("Should fail");

        assert!(matches!(err, PredictorError::MalformedResponse(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_status_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Heart Disease Neural Network API is Running!",
                "status": "Active",
                "model_loaded": true,
                "expected_features": ["age", "sex"],
            })))
            .mount(&server)
            .await;

        let uri = server.uri();
        let status = tokio::task::spawn_blocking(move || {
            HttpPredictor::new(uri, Duration::from_secs(5))
                .expect("Should build client")
                .status()
        })
        .await
        .expect("Should join")
        .expect("Should fetch status");

        assert!(status.model_loaded);
        assert_eq!(status.status, "Active");
        assert_eq!(status.expected_features.len(), 2);
    }

    #[test]
    fn test_unreachable_service_is_transport_error() {
        // Port 9 (discard) is not expected to accept HTTP connections locally.
        let predictor = HttpPredictor::new("http://127.0.0.1:9", Duration::from_secs(2))
            .expect("Should build client");
        let err = predictor
            .predict(&ClinicalRecord::default())
            .expect_err("Should fail");
        assert!(matches!(err, PredictorError::Transport(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let predictor = HttpPredictor::new("http://localhost:5000/", Duration::from_secs(1))
            .expect("Should build client");
        assert_eq!(predictor.base_url(), "http://localhost:5000");
        assert_eq!(predictor.endpoint("/predict"), "http://localhost:5000/predict");
    }
}
