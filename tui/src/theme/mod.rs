//! Theme and Colors
//!
//! The widget's fixed palette. There is no theme resolution: every surface
//! element maps to exactly one of these.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Message Colors
// ============================================================================

/// User messages and the input line
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// Assistant answers and the welcome message
pub const ASSISTANT_BLUE: Color = Color::Rgb(150, 180, 255);

/// Error replies and the error banner
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Clickable follow-up questions
pub const FOLLOW_UP_YELLOW: Color = Color::Rgb(255, 223, 128);

// ============================================================================
// Chrome Colors
// ============================================================================

/// Modal border, title and launcher
pub const ACCENT: Color = Color::Rgb(100, 180, 255);

/// Status line, empty state and host text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Style for a clickable follow-up line
pub fn follow_up_style() -> Style {
    Style::default()
        .fg(FOLLOW_UP_YELLOW)
        .add_modifier(Modifier::UNDERLINED)
}

/// Style for the modal border and title
pub fn accent_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}
