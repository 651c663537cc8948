//! HTTP Backend Implementation
//!
//! Talks to the question-answering REST API:
//! - `POST /ask` - ask a question, optionally continuing a session
//! - `GET /session/{id}` - session metadata
//! - `GET /` - health probe

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::traits::{ApiEnvelope, AskBackend, AskRequest, AskResponse, BackendError, SessionInfo};

/// HTTP backend client
#[derive(Clone, Debug)]
pub struct HttpBackend {
    /// Base URL without trailing slash
    base_url: String,
    /// Shared HTTP client
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client with the default 30 second timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a client with a custom request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// The normalized base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url)
    }

    fn session_url(&self, session_id: &str) -> String {
        format!("{}/session/{}", self.base_url, session_id)
    }

    fn health_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// Check the status and decode the JSON body
    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ApiEnvelope<T>, BackendError> {
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AskBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
        tracing::debug!(
            url = %self.ask_url(),
            has_session = request.session_id.is_some(),
            "Sending question"
        );

        let response = self
            .http_client
            .post(self.ask_url())
            .json(request)
            .send()
            .await?;

        Self::read_envelope(response).await
    }

    async fn session_info(
        &self,
        session_id: &str,
    ) -> Result<ApiEnvelope<SessionInfo>, BackendError> {
        let response = self
            .http_client
            .get(self.session_url(session_id))
            .send()
            .await?;

        Self::read_envelope(response).await
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Health check failed");
                false
            }
        }
    }
}
