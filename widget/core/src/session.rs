//! Conversation Session Management
//!
//! The [`SessionManager`] owns everything a chat widget knows about the
//! ongoing conversation: the ordered message list, the backend session ID,
//! the in-flight flag and the last error.
//!
//! # Design Philosophy
//!
//! All state is mutated through `&mut self` by a single owner (the render
//! loop), so nothing here is locked. Sending is split in two halves so a
//! surface can run the network call on a spawned task and keep drawing:
//!
//! ```text
//! begin_send(question) ──→ AskRequest ──→ backend.ask() ──→ complete_send(result)
//!   appends user message                                  appends answer or error reply
//!   sets in-flight                                        clears in-flight
//! ```
//!
//! [`SessionManager::send`] runs both halves inline.
//!
//! Failures never escape: they become an error string plus an error reply
//! in the message list. The only terminal state is a missing base URL.

use std::sync::Arc;

use crate::backend::{AskBackend, AskData, AskRequest, AskResponse, BackendError, SessionInfo};
use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::messages::{Message, MessageId};
use crate::storage::SessionStore;

/// Text placed before the error description in an error reply
pub const ERROR_REPLY_PREFIX: &str = "Sorry, I encountered an error: ";

/// Question sent when the user accepts a follow-up suggestion
pub const FOLLOW_UP_ACCEPT: &str = "Yes";

/// Message used when the backend rejects a question without saying why
const DEFAULT_FAILURE_MESSAGE: &str = "Failed to get answer";

type InitCallback = Box<dyn FnOnce() + Send>;

/// Initialization progress
#[derive(Debug)]
enum InitState {
    /// `initialize` has not run
    Pending,
    /// Ready to send
    Ready,
    /// Configuration is unusable; the widget stays inert
    Failed(WidgetError),
}

/// Owner of one conversation
pub struct SessionManager<B: AskBackend, S: SessionStore> {
    config: WidgetConfig,
    backend: Arc<B>,
    store: S,
    messages: Vec<Message>,
    session_id: Option<String>,
    loading: bool,
    /// Bumped by `clear`; replies to requests from an older epoch are dropped
    epoch: u64,
    /// Epoch the in-flight request was started in
    request_epoch: u64,
    error: Option<String>,
    init: InitState,
    has_opened: bool,
    on_init: Option<InitCallback>,
}

impl<B: AskBackend, S: SessionStore> SessionManager<B, S> {
    /// Create a manager; call [`initialize`](Self::initialize) before sending
    pub fn new(config: WidgetConfig, backend: Arc<B>, store: S) -> Self {
        Self {
            config,
            backend,
            store,
            messages: Vec::new(),
            session_id: None,
            loading: false,
            epoch: 0,
            request_epoch: 0,
            error: None,
            init: InitState::Pending,
            has_opened: false,
            on_init: None,
        }
    }

    /// Run `callback` once initialization succeeds
    #[must_use]
    pub fn with_on_init(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_init = Some(Box::new(callback));
        self
    }

    /// Check configuration and resume the stored session
    ///
    /// A missing base URL is recorded as [`init_error`](Self::init_error)
    /// rather than returned. Runs at most once.
    pub fn initialize(&mut self) {
        if !matches!(self.init, InitState::Pending) {
            tracing::debug!("Session manager already initialized, ignoring");
            return;
        }

        let Some(base_url) = self.config.effective_base_url().map(str::to_string) else {
            let err = WidgetError::Config("a base URL is required".to_string());
            tracing::warn!(error = %err, "Chat widget is not configured");
            self.init = InitState::Failed(err);
            return;
        };

        match self.store.load(&self.config.storage_key) {
            Ok(Some(session_id)) if !session_id.is_empty() => {
                tracing::info!(session_id = %session_id, "Resuming stored session");
                self.session_id = Some(session_id);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored session, starting fresh");
            }
        }

        self.init = InitState::Ready;
        tracing::info!(
            backend = self.backend.name(),
            base_url = %base_url,
            "Chat widget initialized"
        );

        if let Some(callback) = self.on_init.take() {
            callback();
        }
    }

    /// Mark the conversation visible
    ///
    /// The first open seeds the welcome message into an empty conversation.
    /// Later opens freeze every existing message so nothing re-animates.
    pub fn open(&mut self) {
        if self.has_opened {
            for msg in &mut self.messages {
                msg.suppress_reveal = true;
            }
            return;
        }

        self.has_opened = true;
        if self.messages.is_empty() {
            self.seed_welcome();
        }
    }

    fn seed_welcome(&mut self) {
        if let Some(welcome) = self.config.welcome_message.as_deref() {
            if !welcome.is_empty() {
                self.messages.push(Message::welcome(welcome));
            }
        }
    }

    /// Record a question and build its request
    ///
    /// Returns `None` without touching any state when the question is
    /// blank, a request is already in flight, or the manager is not ready.
    pub fn begin_send(&mut self, question: &str) -> Option<AskRequest> {
        let question = question.trim();
        if question.is_empty() {
            tracing::debug!("Ignoring empty question");
            return None;
        }
        if self.loading {
            tracing::debug!("Request already in flight, dropping question");
            return None;
        }
        if !self.is_ready() {
            tracing::debug!("Session manager not ready, dropping question");
            return None;
        }

        self.messages.push(Message::user(question));
        self.loading = true;
        self.request_epoch = self.epoch;
        self.error = None;

        Some(AskRequest::new(question).with_session(self.session_id.clone()))
    }

    /// Record the outcome of a request started with [`begin_send`](Self::begin_send)
    ///
    /// Returns the ID of the appended reply, or `None` if no request was in
    /// flight or the conversation was cleared since the request started. A
    /// reply to a cleared conversation only ends the in-flight state.
    pub fn complete_send(&mut self, result: Result<AskResponse, BackendError>) -> Option<MessageId> {
        if !self.loading {
            tracing::debug!("No request in flight, ignoring response");
            return None;
        }
        self.loading = false;

        if self.request_epoch != self.epoch {
            tracing::debug!("Conversation cleared while waiting, discarding response");
            return None;
        }

        let reply = match Self::interpret(result) {
            Ok(data) => {
                if let Some(session_id) = data.session_id.filter(|id| !id.is_empty()) {
                    self.adopt_session(session_id);
                }
                Message::answer(data.answer, data.follow_up_question, data.conversation_id)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Question failed");
                let description = err.to_string();
                let reply = Message::error(format!("{ERROR_REPLY_PREFIX}{description}"));
                self.error = Some(description);
                reply
            }
        };

        let id = reply.id.clone();
        self.messages.push(reply);
        Some(id)
    }

    fn interpret(result: Result<AskResponse, BackendError>) -> Result<AskData, WidgetError> {
        let response = result?;
        if !response.status {
            let message = if response.message.is_empty() {
                DEFAULT_FAILURE_MESSAGE.to_string()
            } else {
                response.message
            };
            return Err(WidgetError::Application(message));
        }
        response.data.ok_or(WidgetError::MalformedResponse)
    }

    /// Persist a session ID, skipping the write when it is unchanged
    fn adopt_session(&mut self, session_id: String) {
        if self.session_id.as_deref() == Some(session_id.as_str()) {
            return;
        }

        tracing::info!(session_id = %session_id, "Adopted new session");
        if let Err(e) = self.store.save(&self.config.storage_key, &session_id) {
            tracing::warn!(error = %e, "Failed to persist session ID");
        }
        self.session_id = Some(session_id);
    }

    /// Ask a question and wait for the reply
    ///
    /// Returns the ID of the appended reply, or `None` if the question was
    /// dropped.
    pub async fn send(&mut self, question: &str) -> Option<MessageId> {
        let request = self.begin_send(question)?;
        let backend = Arc::clone(&self.backend);
        let result = backend.ask(&request).await;
        self.complete_send(result)
    }

    /// Accept a follow-up suggestion
    ///
    /// The backend keeps the suggestion in session context, so the reply is
    /// always the fixed affirmative regardless of which suggestion was
    /// clicked.
    pub async fn accept_follow_up(&mut self, _follow_up: &str) -> Option<MessageId> {
        self.send(FOLLOW_UP_ACCEPT).await
    }

    /// Split counterpart of [`accept_follow_up`](Self::accept_follow_up)
    pub fn begin_follow_up(&mut self) -> Option<AskRequest> {
        self.begin_send(FOLLOW_UP_ACCEPT)
    }

    /// Forget the conversation and its session
    ///
    /// A request still in flight keeps the loading state until it returns,
    /// but its reply is discarded.
    pub fn clear(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.messages.clear();
        self.session_id = None;
        self.error = None;
        if let Err(e) = self.store.remove(&self.config.storage_key) {
            tracing::warn!(error = %e, "Failed to remove stored session");
        }
        self.seed_welcome();
        tracing::info!("Conversation cleared");
    }

    /// Hide the error banner
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Metadata for the current session
    ///
    /// Returns `Ok(None)` when there is no session yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn session_info(&self) -> Result<Option<SessionInfo>, WidgetError> {
        let Some(session_id) = self.session_id.as_deref() else {
            return Ok(None);
        };
        if !self.is_ready() {
            return Ok(None);
        }

        let envelope = self.backend.session_info(session_id).await?;
        if !envelope.status {
            return Err(WidgetError::Application(envelope.message));
        }
        Ok(envelope.data)
    }

    /// Whether the backend answers its health probe
    pub async fn health_check(&self) -> bool {
        self.is_ready() && self.backend.health_check().await
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Messages in insertion order
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Look up a message
    #[must_use]
    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|msg| &msg.id == id)
    }

    /// Whether the conversation has no messages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Backend session ID, once one has been assigned
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Whether a request is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Description of the last failed request
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Why initialization failed
    #[must_use]
    pub fn init_error(&self) -> Option<&WidgetError> {
        match &self.init {
            InitState::Failed(err) => Some(err),
            InitState::Pending | InitState::Ready => None,
        }
    }

    /// Whether questions can be sent
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.init, InitState::Ready)
    }

    /// Whether the conversation has been shown at least once
    #[must_use]
    pub fn has_opened(&self) -> bool {
        self.has_opened
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Shared backend, for running requests off the owning task
    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Durable store holding the session ID
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<B: AskBackend, S: SessionStore> std::fmt::Debug for SessionManager<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("backend", &self.backend.name())
            .field("messages", &self.messages.len())
            .field("session_id", &self.session_id)
            .field("loading", &self.loading)
            .field("epoch", &self.epoch)
            .field("error", &self.error)
            .field("init", &self.init)
            .finish_non_exhaustive()
    }
}
