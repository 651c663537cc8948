//! Chat Widget Core - Headless Conversation Engine for an Embeddable Chat Widget
//!
//! This crate provides the conversation logic of the chat widget, completely
//! independent of any UI framework. It can drive a terminal UI, a native
//! GUI, or run headless for testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        UI Surface                               │
//! │   launcher ── modal ── message list ── input ── follow-up       │
//! │       │          │          │                       │           │
//! │  ModalAnimator   │     Typewriter per message       │           │
//! │       │          │          │                       │           │
//! │   Opened ──→ open()   split_follow_up()  ──→ accept_follow_up() │
//! └──────────────────┼──────────────────────────────────────────────┘
//!                    │ begin_send / complete_send
//! ┌──────────────────┼──────────────────────────────────────────────┐
//! │                  ▼       CHAT WIDGET CORE                       │
//! │  ┌──────────────────────────┐   ┌───────────────────────────┐   │
//! │  │      SessionManager      │──→│ AskBackend (HttpBackend)  │   │
//! │  │ messages, session id,    │   └───────────────────────────┘   │
//! │  │ in-flight, error         │   ┌───────────────────────────┐   │
//! │  │                          │──→│ SessionStore (file/memory)│   │
//! │  └──────────────────────────┘   └───────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`SessionManager`]: Owns the conversation and talks to the backend
//! - [`Typewriter`]: Reveals message text one character at a time
//! - [`ModalAnimator`]: Open/close state machine for the widget panel
//! - [`HttpBackend`]: REST client for the question-answering API
//! - [`WidgetConfig`]: Layered configuration (CLI, env, TOML, defaults)
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use chat_widget_core::{
//!     FileSessionStore, HttpBackend, SessionManager, WidgetConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = WidgetConfig::with_base_url("https://example.com/api")
//!         .welcome("Hi! How can I help?");
//!     let backend = HttpBackend::new("https://example.com/api")?;
//!     let store = FileSessionStore::new("/tmp/chat-widget.json");
//!
//!     let mut session = SessionManager::new(config, Arc::new(backend), store);
//!     session.initialize();
//!     session.open();
//!
//!     if let Some(reply) = session.send("What is your refund policy?").await {
//!         println!("{}", session.message(&reply).map_or("", |m| &m.content));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`animation`]: Typewriter revealer, its Tokio driver, and the modal state machine
//! - [`backend`]: Backend abstraction and the HTTP client
//! - [`config`]: Configuration loading
//! - [`error`]: Conversation error types
//! - [`followup`]: Follow-up gating rule
//! - [`messages`]: Message model
//! - [`session`]: Conversation session management
//! - [`storage`]: Durable session ID storage
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod backend;
pub mod config;
pub mod error;
pub mod followup;
pub mod messages;
pub mod session;
pub mod storage;

pub use animation::{
    ModalAnimator, ModalState, ModalTransition, RevealState, RevealTick, Typewriter,
    TypewriterHandle,
};
pub use backend::{AskBackend, AskRequest, AskResponse, BackendError, HttpBackend};
pub use config::{ConfigError, ConfigOverrides, ConfigSource, WidgetConfig};
pub use error::WidgetError;
pub use followup::{split_follow_up, FollowUpView};
pub use messages::{Message, MessageId, MessageKind, MessageRole};
pub use session::{SessionManager, ERROR_REPLY_PREFIX, FOLLOW_UP_ACCEPT};
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore, StorageError};
