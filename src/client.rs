use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Detection, SelectionPoint};

pub type SubmitResult<T> = Result<T, SubmitError>;

/// Failure of one submission attempt, normalized at the client boundary.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The request never completed usefully: unreachable service, timeout,
    /// or a non-success status.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered, but not with a list of detections.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Configuration for the submission client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint receiving the `{x, y, image}` payload.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/api/crop".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    /// Read the endpoint and timeout from `CROP_SERVICE_URL` and
    /// `CROP_SERVICE_TIMEOUT` (seconds), falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: std::env::var("CROP_SERVICE_URL").unwrap_or(defaults.endpoint),
            timeout: std::env::var("CROP_SERVICE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

#[derive(Serialize)]
struct CropRequest<'a> {
    x: f64,
    y: f64,
    image: &'a str,
}

/// HTTP client submitting point-and-snapshot payloads to the crop service.
pub struct SubmissionClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl SubmissionClient {
    pub fn new(config: ClientConfig) -> SubmitResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Build a client configured from the environment.
    pub fn from_env() -> SubmitResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Submit one point and snapshot as a single best-effort request.
    ///
    /// Coordinates are rounded to three decimal places, so identical clicks
    /// produce byte-identical payloads. The detections come back in service
    /// order; an empty list is a valid outcome, not an error. Callers must
    /// not start a second submission before this one resolves.
    pub async fn submit(
        &self,
        point: SelectionPoint,
        snapshot: &str,
    ) -> SubmitResult<Vec<Detection>> {
        let request = CropRequest {
            x: round3(point.x),
            y: round3(point.y),
            image: snapshot,
        };
        log::debug!(
            "submitting x={} y={} to {}",
            request.x,
            request.y,
            self.config.endpoint
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| SubmitError::Malformed(format!("undecodable body: {e}")))?;
        if !value.is_array() {
            return Err(SubmitError::Malformed(
                "response body is not a list".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| SubmitError::Malformed(format!("unexpected list element: {e}")))
    }
}

/// Round to three decimal places, bounding the payload's coordinate
/// precision.
fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
