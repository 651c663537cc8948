//! Follow-up Gating
//!
//! An answer's follow-up question is part of its content, so it is typed out
//! along with the answer. Renderers split it off and only make it clickable
//! once the reveal has finished and the question is actually on screen.

/// A revealed message split into answer text and clickable follow-up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FollowUpView<'a> {
    /// Text to render as the answer body
    pub answer: &'a str,
    /// Follow-up to render as clickable, once it may be shown
    pub follow_up: Option<&'a str>,
}

/// Split the displayed text of a message around its follow-up question
///
/// `displayed` is what the typewriter currently shows, `follow_up` the
/// message's follow-up text, `is_typing` whether the reveal is still running.
#[must_use]
pub fn split_follow_up<'a>(
    displayed: &'a str,
    follow_up: Option<&'a str>,
    is_typing: bool,
) -> FollowUpView<'a> {
    let Some(question) = follow_up.filter(|q| !q.is_empty()) else {
        return FollowUpView {
            answer: displayed,
            follow_up: None,
        };
    };

    // The follow-up is appended last, so only a copy ending the text is it
    match displayed.strip_suffix(question) {
        Some(answer) => FollowUpView {
            answer: answer.trim_end(),
            follow_up: (!is_typing).then_some(question),
        },
        None => FollowUpView {
            answer: displayed,
            follow_up: None,
        },
    }
}
