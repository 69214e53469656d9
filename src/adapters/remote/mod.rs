//! HTTP client for the remote prediction service.
//!
//! Endpoints:
//! - `GET  /health`
//! - `POST /predict_risk` with a [`WorkerProfile`] body
//! - `POST /predict_risk_from_text` with a [`TextProfile`] body
//! - `POST /extract_keywords?type=<kind>` with `{"text": ...}`

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::domain::{PredictionInput, PredictionResult, PredictionSource};
use crate::ports::{KeywordExtractor, KeywordKind, PredictorError, RiskPredictor};

#[derive(Debug, Serialize)]
struct KeywordRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct KeywordResponse {
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: String,
}

/// Remote predictor and keyword extractor.
#[derive(Debug, Clone)]
pub struct HttpRiskPredictor {
    client: Client,
    base_url: String,
}

impl HttpRiskPredictor {
    /// Build a client for `base_url` (no trailing slash needed).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PredictorError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| PredictorError::Transport(format!("Failed to build HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Build from configuration; `Ok(None)` when no URL is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &RemoteConfig) -> Result<Option<Self>, PredictorError> {
        config
            .base_url
            .as_deref()
            .map(|url| Self::new(url, config.timeout))
            .transpose()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, PredictorError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .map_err(|e| PredictorError::Transport(e.to_string()))?;
        check_status(response)
    }
}

fn check_status(response: Response) -> Result<Response, PredictorError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().unwrap_or_default();
        Err(PredictorError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl RiskPredictor for HttpRiskPredictor {
    fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, PredictorError> {
        let response = match input {
            PredictionInput::Structured(profile) => self.post_json("/predict_risk", profile)?,
            PredictionInput::FreeText(text) => self.post_json("/predict_risk_from_text", text)?,
        };

        let mut result: PredictionResult = response
            .json()
            .map_err(|e| PredictorError::InvalidResponse(e.to_string()))?;
        result.source = PredictionSource::Remote;

        debug!(overall = result.overall_risk, "Remote prediction received");
        Ok(result.normalized())
    }

    fn is_available(&self) -> bool {
        let response = match self.client.get(self.url("/health")).send() {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %self.base_url, error = %e, "Remote prediction service unreachable");
                return false;
            }
        };

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "Remote health check failed");
            return false;
        }

        match response.json::<HealthResponse>() {
            Ok(health) => health.status.is_empty() || health.status == "healthy",
            Err(_) => true,
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

impl KeywordExtractor for HttpRiskPredictor {
    fn extract(&self, text: &str, kind: KeywordKind) -> Result<Vec<String>, PredictorError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let path = format!("/extract_keywords?type={}", kind.as_str());
        let response = self.post_json(&path, &KeywordRequest { text })?;
        let parsed: KeywordResponse = response
            .json()
            .map_err(|e| PredictorError::InvalidResponse(e.to_string()))?;
        Ok(parsed.keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TextProfile, WorkerProfile};

    // Port 9 (discard) is reserved and nothing listens on it locally.
    fn unreachable() -> HttpRiskPredictor {
        HttpRiskPredictor::new("http://127.0.0.1:9/", Duration::from_millis(200))
            .expect("Should build client")
    }

    #[test]
    fn test_base_url_trimmed() {
        assert_eq!(unreachable().base_url(), "http://127.0.0.1:9");
    }

    #[test]
    fn test_from_config_without_url() {
        let client = HttpRiskPredictor::from_config(&RemoteConfig::default())
            .expect("Should not fail without a URL");
        assert!(client.is_none());
    }

    #[test]
    fn test_unreachable_service_is_unavailable() {
        assert!(!unreachable().is_available());
    }

    #[test]
    fn test_unreachable_service_prediction_fails() {
        let remote = unreachable();
        let err = remote
            .predict(&PredictionInput::Structured(WorkerProfile::default()))
            .expect_err("Should fail without a server");
        assert!(matches!(err, PredictorError::Transport(_)));

        let err = remote
            .predict(&PredictionInput::FreeText(TextProfile::default()))
            .expect_err("Should fail without a server");
        assert!(matches!(err, PredictorError::Transport(_)));
    }

    #[test]
    fn test_empty_keyword_text_skips_request() {
        let keywords = unreachable()
            .extract("", KeywordKind::Chemical)
            .expect("Empty text should not hit the network");
        assert!(keywords.is_empty());
    }
}
