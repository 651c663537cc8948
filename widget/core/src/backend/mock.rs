//! Scripted backend for tests
//!
//! Replays queued results in order and records every request it receives.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::traits::{
    ApiEnvelope, AskBackend, AskData, AskRequest, AskResponse, BackendError, SessionInfo,
};

/// Backend that answers from a queue
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    responses: Arc<Mutex<VecDeque<Result<AskResponse, BackendError>>>>,
    requests: Arc<Mutex<Vec<AskRequest>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful answer
    pub fn push_answer(&self, answer: &str, follow_up: Option<&str>, session_id: &str) {
        self.push(Ok(ApiEnvelope {
            status: true,
            code: "00".to_string(),
            message: "Success".to_string(),
            data: Some(AskData {
                answer: answer.to_string(),
                follow_up_question: follow_up.map(str::to_string),
                conversation_id: Some(1),
                session_id: Some(session_id.to_string()),
            }),
        }));
    }

    /// Queue a `status: false` payload
    pub fn push_failure(&self, message: &str) {
        self.push(Ok(ApiEnvelope {
            status: false,
            code: "01".to_string(),
            message: message.to_string(),
            data: None,
        }));
    }

    /// Queue any result
    pub fn push(&self, result: Result<AskResponse, BackendError>) {
        self.responses.lock().push_back(result);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<AskRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl AskBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or(Err(BackendError::Decode("no scripted response".to_string())))
    }

    async fn session_info(
        &self,
        session_id: &str,
    ) -> Result<ApiEnvelope<SessionInfo>, BackendError> {
        Ok(ApiEnvelope {
            status: true,
            code: "00".to_string(),
            message: String::new(),
            data: Some(SessionInfo {
                session_id: session_id.to_string(),
                created_at: None,
                last_activity: None,
                question_count: Some(self.call_count() as u64),
                remaining_idle_seconds: None,
            }),
        })
    }

    async fn health_check(&self) -> bool {
        true
    }
}
