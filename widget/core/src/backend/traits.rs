//! Backend Traits
//!
//! The request/response contract of the question-answering backend and the
//! trait the session manager talks to. Implementations handle transport
//! details; the session manager only sees [`AskRequest`] and [`AskResponse`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by a backend implementation
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("HTTP error! status: {status}")]
    Http {
        /// Response status code
        status: u16,
    },

    /// The response body was not the expected JSON
    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Body of `POST /ask`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question, already trimmed
    pub question: String,
    /// Session to continue, omitted for a fresh conversation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AskRequest {
    /// Create a request without a session
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            session_id: None,
        }
    }

    /// Continue an existing session
    #[must_use]
    pub fn with_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }
}

/// Standard response envelope used by every endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Application-level success flag
    pub status: bool,
    /// Backend result code (e.g. `"00"`)
    #[serde(default)]
    pub code: String,
    /// Human-readable message, the failure reason when `status` is false
    #[serde(default)]
    pub message: String,
    /// Payload, present on success
    pub data: Option<T>,
}

/// Payload of a successful `POST /ask`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskData {
    /// The answer text
    pub answer: String,
    /// Suggested next question
    #[serde(default)]
    pub follow_up_question: Option<String>,
    /// Backend conversation row
    #[serde(default)]
    pub conversation_id: Option<u64>,
    /// Session the answer belongs to
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response of `POST /ask`
pub type AskResponse = ApiEnvelope<AskData>;

/// Payload of `GET /session/{id}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// The session identifier
    pub session_id: String,
    /// Creation time as reported by the backend
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last activity time as reported by the backend
    #[serde(default)]
    pub last_activity: Option<String>,
    /// Questions asked in this session
    #[serde(default)]
    pub question_count: Option<u64>,
    /// Seconds until the session expires from inactivity
    #[serde(default, alias = "time_remaining")]
    pub remaining_idle_seconds: Option<u64>,
}

/// A question-answering backend
///
/// Implement this trait to plug a different transport under the session
/// manager (HTTP in production, scripted responses in tests).
#[async_trait]
pub trait AskBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Ask a question
    ///
    /// Returns the envelope as sent by the backend for any 2xx response;
    /// interpreting `status` is the caller's job.
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError>;

    /// Fetch metadata about a session
    async fn session_info(&self, session_id: &str)
        -> Result<ApiEnvelope<SessionInfo>, BackendError>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;
}
