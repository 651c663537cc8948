//! Conversation Messages
//!
//! The message model shared by the session manager and every rendering
//! surface. Messages are append-only: once created, only the
//! `suppress_reveal` flag may change.
//!
//! # Message IDs
//!
//! IDs carry their kind as a prefix (`user-`, `assistant-`, `welcome-`,
//! `error-`) so a renderer can decide how to reveal a message from the ID
//! alone, without consulting any other state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What produced a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Question typed by the user
    User,
    /// Answer returned by the backend
    Assistant,
    /// Configured greeting shown on first open
    Welcome,
    /// Synthetic reply describing a failed request
    Error,
}

impl MessageKind {
    /// ID prefix for this kind
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Welcome => "welcome",
            Self::Error => "error",
        }
    }

    /// Role a message of this kind is rendered with
    #[must_use]
    pub fn role(self) -> MessageRole {
        match self {
            Self::User => MessageRole::User,
            Self::Assistant | Self::Welcome | Self::Error => MessageRole::Assistant,
        }
    }

    /// Whether messages of this kind must never animate
    #[must_use]
    pub fn always_instant(self) -> bool {
        matches!(self, Self::User | Self::Error)
    }
}

/// Message identifier, `{kind}-{uuid}`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique ID for the given kind
    #[must_use]
    pub fn new(kind: MessageKind) -> Self {
        Self(format!("{}-{}", kind.prefix(), uuid::Uuid::new_v4()))
    }

    /// Recover the kind from the ID prefix
    ///
    /// Returns `None` for IDs that were not produced by [`MessageId::new`].
    #[must_use]
    pub fn kind(&self) -> Option<MessageKind> {
        let (prefix, _) = self.0.split_once('-')?;
        [
            MessageKind::User,
            MessageKind::Assistant,
            MessageKind::Welcome,
            MessageKind::Error,
        ]
        .into_iter()
        .find(|kind| kind.prefix() == prefix)
    }

    /// Whether this ID marks an error reply
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind() == Some(MessageKind::Error)
    }

    /// Borrow the raw ID string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who a message is attributed to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input
    User,
    /// Backend answers, greetings and error replies
    Assistant,
}

/// One conversational turn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique, kind-prefixed ID
    pub id: MessageId,
    /// Who the message is attributed to
    pub role: MessageRole,
    /// Full text, including the follow-up question when one exists
    pub content: String,
    /// When the message was created
    pub created_at: DateTime<Utc>,
    /// Backend conversation ID for answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<u64>,
    /// Suggested follow-up question, answers only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_text: Option<String>,
    /// Render instantly instead of through the typewriter
    #[serde(default)]
    pub suppress_reveal: bool,
}

impl Message {
    fn with_kind(kind: MessageKind, content: String, suppress_reveal: bool) -> Self {
        Self {
            id: MessageId::new(kind),
            role: kind.role(),
            content,
            created_at: Utc::now(),
            conversation_id: None,
            follow_up_text: None,
            suppress_reveal,
        }
    }

    /// A question typed by the user (never animated)
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_kind(MessageKind::User, content.into(), true)
    }

    /// A backend answer, with its follow-up appended after a blank line
    #[must_use]
    pub fn answer(
        answer: impl Into<String>,
        follow_up: Option<String>,
        conversation_id: Option<u64>,
    ) -> Self {
        let answer = answer.into();
        let follow_up = follow_up.filter(|f| !f.is_empty());
        let content = match &follow_up {
            Some(question) => format!("{answer}\n\n{question}"),
            None => answer,
        };

        let mut msg = Self::with_kind(MessageKind::Assistant, content, false);
        msg.conversation_id = conversation_id;
        msg.follow_up_text = follow_up;
        msg
    }

    /// The configured greeting (allowed to animate on first open)
    #[must_use]
    pub fn welcome(content: impl Into<String>) -> Self {
        Self::with_kind(MessageKind::Welcome, content.into(), false)
    }

    /// A reply describing a failed request (never animated)
    #[must_use]
    pub fn error(content: impl Into<String>) -> Self {
        Self::with_kind(MessageKind::Error, content.into(), true)
    }

    /// Kind recovered from the ID
    #[must_use]
    pub fn kind(&self) -> Option<MessageKind> {
        self.id.kind()
    }

    /// Whether a renderer should animate this message
    #[must_use]
    pub fn should_reveal(&self) -> bool {
        !self.suppress_reveal && !self.kind().is_some_and(MessageKind::always_instant)
    }

    /// Number of characters in the content
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_id_carries_kind() {
        for kind in [
            MessageKind::User,
            MessageKind::Assistant,
            MessageKind::Welcome,
            MessageKind::Error,
        ] {
            let id = MessageId::new(kind);
            assert!(id.as_str().starts_with(&format!("{}-", kind.prefix())));
            assert_eq!(id.kind(), Some(kind));
        }
    }

    #[test]
    fn test_message_id_unknown_prefix() {
        assert_eq!(MessageId("msg_1".to_string()).kind(), None);
        assert_eq!(MessageId("system-abc".to_string()).kind(), None);
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = MessageId::new(MessageKind::User);
        let b = MessageId::new(MessageKind::User);
        assert_ne!(a, b);
    }

    #[test]
    fn test_answer_with_follow_up() {
        let msg = Message::answer("Our policy...", Some("Want more?".to_string()), Some(73));
        assert_eq!(msg.content, "Our policy...\n\nWant more?");
        assert_eq!(msg.follow_up_text.as_deref(), Some("Want more?"));
        assert_eq!(msg.conversation_id, Some(73));
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.should_reveal());
    }

    #[test]
    fn test_answer_without_follow_up() {
        let msg = Message::answer("Plain answer", None, None);
        assert_eq!(msg.content, "Plain answer");
        assert_eq!(msg.follow_up_text, None);
    }

    #[test]
    fn test_empty_follow_up_is_dropped() {
        let msg = Message::answer("Answer", Some(String::new()), None);
        assert_eq!(msg.content, "Answer");
        assert_eq!(msg.follow_up_text, None);
    }

    #[test]
    fn test_user_and_error_never_reveal() {
        let user = Message::user("hi");
        assert_eq!(user.role, MessageRole::User);
        assert!(!user.should_reveal());

        let mut error = Message::error("Sorry");
        assert_eq!(error.role, MessageRole::Assistant);
        assert!(error.id.is_error());
        // Even if the flag were cleared, the ID still forces instant rendering
        error.suppress_reveal = false;
        assert!(!error.should_reveal());
    }

    #[test]
    fn test_welcome_reveals_until_suppressed() {
        let mut welcome = Message::welcome("Hello!");
        assert!(welcome.should_reveal());
        welcome.suppress_reveal = true;
        assert!(!welcome.should_reveal());
    }

    #[test]
    fn test_char_len_counts_scalars() {
        let msg = Message::user("héllo");
        assert_eq!(msg.char_len(), 5);
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let msg = Message::answer("A", Some("B?".to_string()), Some(1));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["followUpText"], "B?");
        assert_eq!(json["conversationId"], 1);
        assert_eq!(json["suppressReveal"], false);
        assert_eq!(json["role"], "assistant");
    }
}
