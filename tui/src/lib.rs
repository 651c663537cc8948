//! Chat Widget TUI - Terminal surface for the embeddable chat widget
//!
//! This crate draws the chat widget over a placeholder host screen: a
//! launcher line in the corner, and a modal that slides up from the bottom
//! edge with the conversation, a follow-up suggestion and an input line.
//!
//! # Architecture
//!
//! - **Compositor**: Layered rendering with z-ordering for the sliding modal
//! - **Display**: Per-message typewriter progress on top of the session manager
//! - **Theme**: Role colors and the follow-up style
//! - **App**: Event loop, key and mouse handling, request dispatch

pub mod app;
pub mod compositor;
pub mod display;
pub mod theme;

pub use app::App;
