//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from the session manager's messages and used for
//! rendering.
//!
//! # Design Philosophy
//!
//! The session manager owns the conversation; the TUI only owns how far each
//! message has been revealed. [`DisplayState`] keeps one [`Typewriter`] per
//! message, created the first time the message is seen and dropped once the
//! message is gone.
//!
//! - DisplayMessage: A message as it should be drawn this frame
//! - DisplayRole: Prefix and color of a message
//! - DisplayState: Per-message reveal progress

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chat_widget_core::{split_follow_up, Message, MessageId, MessageKind, MessageRole, Typewriter};

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// Answers and the welcome message
    Assistant,
    /// Error replies
    Error,
}

impl DisplayRole {
    /// Role to draw a message with
    pub fn of(message: &Message) -> Self {
        match (message.role, message.kind()) {
            (_, Some(MessageKind::Error)) => DisplayRole::Error,
            (MessageRole::User, _) => DisplayRole::User,
            (MessageRole::Assistant, _) => DisplayRole::Assistant,
        }
    }

    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Assistant | DisplayRole::Error => "Assistant: ",
        }
    }
}

/// A message as it should be drawn this frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMessage {
    /// Message ID
    pub id: MessageId,
    /// Prefix and color
    pub role: DisplayRole,
    /// Revealed text, without the follow-up once that is split off
    pub answer: String,
    /// Clickable follow-up, once the reveal has finished
    pub follow_up: Option<String>,
    /// Whether characters are still being revealed
    pub revealing: bool,
}

/// Per-message reveal progress
#[derive(Debug)]
pub struct DisplayState {
    /// One typewriter per message
    reveals: HashMap<MessageId, Typewriter>,
    /// Milliseconds per character for new typewriters
    speed_ms: u64,
}

impl DisplayState {
    /// Create an empty display state
    pub fn new(speed_ms: u64) -> Self {
        Self {
            reveals: HashMap::new(),
            speed_ms,
        }
    }

    /// Track the current message list
    ///
    /// New messages get a typewriter (already complete when they must not
    /// animate), messages flagged `suppress_reveal` since the last sync
    /// finish immediately, and typewriters of removed messages are dropped.
    pub fn sync(&mut self, messages: &[Message]) {
        let live: HashSet<&MessageId> = messages.iter().map(|m| &m.id).collect();
        self.reveals.retain(|id, _| live.contains(id));

        for msg in messages {
            match self.reveals.get_mut(&msg.id) {
                Some(typewriter) => {
                    if !msg.should_reveal() && typewriter.is_typing() {
                        typewriter.skip_to_end();
                    }
                }
                None => {
                    let typewriter = if msg.should_reveal() {
                        Typewriter::new(msg.content.clone(), self.speed_ms)
                    } else {
                        Typewriter::completed(msg.content.clone(), self.speed_ms)
                    };
                    self.reveals.insert(msg.id.clone(), typewriter);
                }
            }
        }
    }

    /// Advance every running reveal; returns whether anything changed
    pub fn update(&mut self, delta: Duration) -> bool {
        let mut changed = false;
        for typewriter in self.reveals.values_mut() {
            changed |= typewriter.advance(delta);
        }
        changed
    }

    /// Build what to draw for each message
    pub fn view(&self, messages: &[Message]) -> Vec<DisplayMessage> {
        messages.iter().map(|msg| self.view_one(msg)).collect()
    }

    fn view_one(&self, msg: &Message) -> DisplayMessage {
        let (displayed, typing) = match self.reveals.get(&msg.id) {
            Some(typewriter) => (typewriter.displayed_text(), typewriter.is_typing()),
            // Not synced yet: draw it whole rather than flash it empty
            None => (msg.content.as_str(), false),
        };
        let view = split_follow_up(displayed, msg.follow_up_text.as_deref(), typing);

        DisplayMessage {
            id: msg.id.clone(),
            role: DisplayRole::of(msg),
            answer: view.answer.to_string(),
            follow_up: view.follow_up.map(str::to_string),
            revealing: typing,
        }
    }

    /// Follow-up of the newest message, if it is clickable
    pub fn latest_follow_up(&self, messages: &[Message]) -> Option<String> {
        messages.last().and_then(|msg| self.view_one(msg).follow_up)
    }

    /// Whether any message is still being revealed
    pub fn is_revealing(&self) -> bool {
        self.reveals.values().any(Typewriter::is_typing)
    }

    /// Typewriter for a message
    pub fn reveal(&self, id: &MessageId) -> Option<&Typewriter> {
        self.reveals.get(id)
    }

    /// Number of tracked messages
    pub fn len(&self) -> usize {
        self.reveals.len()
    }

    /// Whether no messages are tracked
    pub fn is_empty(&self) -> bool {
        self.reveals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MS: Duration = Duration::from_millis(1);

    // ========================================================================
    // DisplayRole Tests
    // ========================================================================

    #[test]
    fn test_display_role_of_message() {
        assert_eq!(DisplayRole::of(&Message::user("Hi")), DisplayRole::User);
        assert_eq!(
            DisplayRole::of(&Message::answer("A", None, None)),
            DisplayRole::Assistant
        );
        assert_eq!(
            DisplayRole::of(&Message::welcome("Hello")),
            DisplayRole::Assistant
        );
        assert_eq!(DisplayRole::of(&Message::error("Oops")), DisplayRole::Error);
    }

    #[test]
    fn test_display_role_prefix() {
        assert_eq!(DisplayRole::User.prefix(), "You: ");
        assert_eq!(DisplayRole::Assistant.prefix(), "Assistant: ");
        assert_eq!(DisplayRole::Error.prefix(), "Assistant: ");
    }

    // ========================================================================
    // Reveal Tests
    // ========================================================================

    #[test]
    fn test_answer_reveals_and_user_is_instant() {
        let messages = vec![
            Message::user("Question?"),
            Message::answer("Answer", None, Some(1)),
        ];
        let mut display = DisplayState::new(10);
        display.sync(&messages);

        let view = display.view(&messages);
        assert_eq!(view[0].answer, "Question?");
        assert!(!view[0].revealing);
        assert_eq!(view[1].answer, "");
        assert!(view[1].revealing);
        assert!(display.is_revealing());

        assert!(display.update(MS * 30));
        assert_eq!(display.view(&messages)[1].answer, "Ans");

        display.update(MS * 1000);
        assert!(!display.is_revealing());
        assert_eq!(display.view(&messages)[1].answer, "Answer");
    }

    #[test]
    fn test_error_reply_is_never_typing() {
        let messages = vec![
            Message::user("Q"),
            Message::error("Sorry, I encountered an error: HTTP error! status: 500"),
        ];
        let mut display = DisplayState::new(10);
        display.sync(&messages);

        let reply = &display.view(&messages)[1];
        assert_eq!(reply.role, DisplayRole::Error);
        assert!(!reply.revealing);
        assert!(!display.reveal(&messages[1].id).unwrap().is_typing());
    }

    #[test]
    fn test_follow_up_appears_after_reveal() {
        let messages = vec![Message::answer(
            "Our policy...",
            Some("Want more?".to_string()),
            Some(73),
        )];
        let mut display = DisplayState::new(10);
        display.sync(&messages);

        display.update(MS * 240);
        let view = &display.view(&messages)[0];
        assert_eq!(view.answer, "Our policy...\n\nWant more");
        assert_eq!(view.follow_up, None);
        assert_eq!(display.latest_follow_up(&messages), None);

        display.update(MS * 10);
        let view = &display.view(&messages)[0];
        assert_eq!(view.answer, "Our policy...");
        assert_eq!(view.follow_up.as_deref(), Some("Want more?"));
        assert_eq!(
            display.latest_follow_up(&messages).as_deref(),
            Some("Want more?")
        );
    }

    #[test]
    fn test_suppressed_messages_finish_on_sync() {
        let mut messages = vec![Message::answer("Long answer", None, None)];
        let mut display = DisplayState::new(10);
        display.sync(&messages);
        assert!(display.is_revealing());

        // The session manager freezes messages when the modal reopens
        messages[0].suppress_reveal = true;
        display.sync(&messages);
        assert!(!display.is_revealing());
        assert_eq!(display.view(&messages)[0].answer, "Long answer");
    }

    #[test]
    fn test_removed_messages_are_pruned() {
        let messages = vec![Message::user("A"), Message::answer("B", None, None)];
        let mut display = DisplayState::new(10);
        display.sync(&messages);
        assert_eq!(display.len(), 2);

        let welcome = vec![Message::welcome("Hello!")];
        display.sync(&welcome);
        assert_eq!(display.len(), 1);
        assert!(display.reveal(&messages[0].id).is_none());
        assert!(display.reveal(&welcome[0].id).unwrap().is_typing());

        display.sync(&[]);
        assert!(display.is_empty());
    }

    #[test]
    fn test_unsynced_message_draws_whole() {
        let messages = vec![Message::answer("Fresh", None, None)];
        let display = DisplayState::new(10);
        let view = display.view(&messages);
        assert_eq!(view[0].answer, "Fresh");
        assert!(!view[0].revealing);
    }

    #[test]
    fn test_zero_speed_is_instant() {
        let messages = vec![Message::welcome("Hello!")];
        let mut display = DisplayState::new(0);
        display.sync(&messages);
        assert!(!display.is_revealing());
    }
}
