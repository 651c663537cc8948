//! Backend Integration
//!
//! Access to the question-answering backend through a common trait, so the
//! session manager can run against HTTP in production and scripted
//! responses in tests.
//!
//! # Usage
//!
//! ```ignore
//! use chat_widget_core::backend::{AskBackend, AskRequest, HttpBackend};
//!
//! let backend = HttpBackend::new("https://example.com/api")?;
//! let response = backend.ask(&AskRequest::new("Hello!")).await?;
//! ```

mod http;
#[cfg(test)]
pub(crate) mod mock;
mod traits;

pub use http::HttpBackend;
pub use traits::{
    ApiEnvelope, AskBackend, AskData, AskRequest, AskResponse, BackendError, SessionInfo,
};
