//! Modal open/close state machine
//!
//! ```text
//!            open()               update() after duration
//!   Closed ─────────→ Opening ─────────────────────────→ Open
//!     ↑                 ↑ │                                │
//!     │          open() │ │ close()                        │ close()
//!     │                 │ ↓                                ↓
//!     └───────────────── Closing ←─────────────────────────┘
//!    update() after duration
//! ```
//!
//! Reversing mid-animation keeps the current openness, so a modal that was
//! 30% closed reopens from 70% rather than jumping.

use std::time::{Duration, Instant};

/// Where the modal is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalState {
    /// Hidden
    Closed,
    /// Sliding in
    Opening {
        /// When the slide would have started from fully closed
        since: Instant,
    },
    /// Fully shown
    Open,
    /// Sliding out
    Closing {
        /// When the slide would have started from fully open
        since: Instant,
    },
}

/// Timed transition reported by [`ModalAnimator::update`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalTransition {
    /// The modal finished opening; the conversation is now visible
    Opened,
    /// The modal finished closing
    Closed,
}

/// Drives the modal through its animation states
#[derive(Clone, Debug)]
pub struct ModalAnimator {
    state: ModalState,
    duration: Duration,
}

impl ModalAnimator {
    /// A closed modal with the given slide duration
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            state: ModalState::Closed,
            duration,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ModalState {
        self.state
    }

    /// Start opening; returns false if already open or opening
    pub fn open(&mut self, now: Instant) -> bool {
        match self.state {
            ModalState::Closed => {
                self.state = ModalState::Opening { since: now };
                true
            }
            ModalState::Closing { .. } => {
                let openness = self.progress(now);
                self.state = ModalState::Opening {
                    since: self.backdate(now, openness),
                };
                true
            }
            ModalState::Opening { .. } | ModalState::Open => false,
        }
    }

    /// Start closing; returns false if already closed or closing
    pub fn close(&mut self, now: Instant) -> bool {
        match self.state {
            ModalState::Open => {
                self.state = ModalState::Closing { since: now };
                true
            }
            ModalState::Opening { .. } => {
                let closedness = 1.0 - self.progress(now);
                self.state = ModalState::Closing {
                    since: self.backdate(now, closedness),
                };
                true
            }
            ModalState::Closing { .. } | ModalState::Closed => false,
        }
    }

    /// Open if closed or closing, close otherwise
    pub fn toggle(&mut self, now: Instant) {
        match self.state {
            ModalState::Closed | ModalState::Closing { .. } => {
                self.open(now);
            }
            ModalState::Open | ModalState::Opening { .. } => {
                self.close(now);
            }
        }
    }

    /// Finish a slide whose duration has elapsed
    pub fn update(&mut self, now: Instant) -> Option<ModalTransition> {
        match self.state {
            ModalState::Opening { since } if self.elapsed_enough(since, now) => {
                self.state = ModalState::Open;
                Some(ModalTransition::Opened)
            }
            ModalState::Closing { since } if self.elapsed_enough(since, now) => {
                self.state = ModalState::Closed;
                Some(ModalTransition::Closed)
            }
            _ => None,
        }
    }

    /// Openness from 0.0 (closed) to 1.0 (open)
    #[must_use]
    pub fn progress(&self, now: Instant) -> f32 {
        match self.state {
            ModalState::Closed => 0.0,
            ModalState::Open => 1.0,
            ModalState::Opening { since } => self.fraction(since, now),
            ModalState::Closing { since } => 1.0 - self.fraction(since, now),
        }
    }

    /// Whether anything should be drawn
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state != ModalState::Closed
    }

    /// Whether a slide is in progress
    #[must_use]
    pub fn is_animating(&self) -> bool {
        matches!(
            self.state,
            ModalState::Opening { .. } | ModalState::Closing { .. }
        )
    }

    fn elapsed_enough(&self, since: Instant, now: Instant) -> bool {
        now.saturating_duration_since(since) >= self.duration
    }

    fn fraction(&self, since: Instant, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(since).as_secs_f32();
        (elapsed / self.duration.as_secs_f32()).min(1.0)
    }

    /// Start time that puts a fresh slide at `fraction` complete
    fn backdate(&self, now: Instant, fraction: f32) -> Instant {
        let offset = self.duration.mul_f32(fraction.clamp(0.0, 1.0));
        now.checked_sub(offset).unwrap_or(now)
    }
}
