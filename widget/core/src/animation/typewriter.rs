//! Typewriter Revealer
//!
//! Reveals a string one character at a time. The revealer itself knows
//! nothing about clocks: callers either feed it elapsed time
//! ([`Typewriter::advance`]) or apply [`RevealTick`] tokens from a timer
//! ([`Typewriter::apply_tick`], see [`super::TypewriterHandle`]).
//!
//! Every reset bumps a generation counter. A tick carries the generation it
//! was issued for, so ticks scheduled before a reset are ignored.

use std::time::Duration;

/// Token for one scheduled character reveal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealTick {
    /// Generation the tick was issued for
    pub generation: u64,
}

/// Snapshot of a reveal run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealState {
    /// Characters currently shown
    pub revealed: usize,
    /// Characters in the full text
    pub total: usize,
}

impl RevealState {
    /// Whether characters remain hidden
    #[must_use]
    pub fn is_revealing(&self) -> bool {
        self.revealed < self.total
    }
}

/// Progressive text revealer
#[derive(Clone, Debug)]
pub struct Typewriter {
    text: String,
    /// Character count of `text`, cached
    total: usize,
    revealed: usize,
    speed: Duration,
    generation: u64,
    /// Time fed through `advance` not yet turned into characters
    accumulated: Duration,
}

impl Typewriter {
    /// Start revealing `text` at `speed_ms` milliseconds per character
    pub fn new(text: impl Into<String>, speed_ms: u64) -> Self {
        let mut typewriter = Self {
            text: String::new(),
            total: 0,
            revealed: 0,
            speed: Duration::from_millis(speed_ms),
            generation: 0,
            accumulated: Duration::ZERO,
        };
        typewriter.reset_to(text.into());
        typewriter
    }

    /// A typewriter that starts fully revealed
    pub fn completed(text: impl Into<String>, speed_ms: u64) -> Self {
        let mut typewriter = Self::new(text, speed_ms);
        typewriter.skip_to_end();
        typewriter
    }

    /// Replace the text; identical text leaves the run untouched
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.reset_to(text);
        }
    }

    /// Start the current text over from empty
    pub fn restart(&mut self) {
        let text = std::mem::take(&mut self.text);
        self.reset_to(text);
    }

    /// Reveal everything now
    pub fn skip_to_end(&mut self) {
        self.revealed = self.total;
        self.accumulated = Duration::ZERO;
    }

    fn reset_to(&mut self, text: String) {
        self.generation = self.generation.wrapping_add(1);
        self.total = text.chars().count();
        self.text = text;
        self.accumulated = Duration::ZERO;
        self.revealed = if self.speed.is_zero() { self.total } else { 0 };
    }

    /// Feed elapsed time; returns whether the displayed text changed
    pub fn advance(&mut self, delta: Duration) -> bool {
        if !self.is_typing() {
            return false;
        }
        self.accumulated += delta;

        let speed = self.speed.as_nanos();
        let elapsed = self.accumulated.as_nanos();
        let steps = elapsed / speed;
        if steps == 0 {
            return false;
        }

        let remaining = self.total - self.revealed;
        let steps = usize::try_from(steps).map_or(remaining, |s| s.min(remaining));
        self.revealed += steps;
        self.accumulated = if self.is_typing() {
            u64::try_from(elapsed % speed).map_or(Duration::ZERO, Duration::from_nanos)
        } else {
            Duration::ZERO
        };
        true
    }

    /// Token for the next scheduled reveal
    #[must_use]
    pub fn tick(&self) -> RevealTick {
        RevealTick {
            generation: self.generation,
        }
    }

    /// Reveal one character if the tick is current; returns whether it applied
    pub fn apply_tick(&mut self, tick: RevealTick) -> bool {
        if tick.generation != self.generation || !self.is_typing() {
            return false;
        }
        self.revealed += 1;
        true
    }

    /// The revealed prefix
    #[must_use]
    pub fn displayed_text(&self) -> &str {
        match self.text.char_indices().nth(self.revealed) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }

    /// The whole target text
    #[must_use]
    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// Whether characters remain hidden
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.revealed < self.total
    }

    /// Snapshot of the run
    #[must_use]
    pub fn state(&self) -> RevealState {
        RevealState {
            revealed: self.revealed,
            total: self.total,
        }
    }

    /// Current generation
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Delay per character
    #[must_use]
    pub fn speed(&self) -> Duration {
        self.speed
    }
}
