//! Timer-driven typewriter
//!
//! Runs a [`Typewriter`] on a Tokio interval. The revealer lives behind an
//! `Arc<Mutex<_>>` shared with the ticking task; readers take snapshots
//! through the handle and await changes through a `watch` channel.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::typewriter::{RevealState, Typewriter};

/// Owner of a typewriter and the task that ticks it
///
/// Must be created inside a Tokio runtime. Dropping the handle stops the task.
pub struct TypewriterHandle {
    typewriter: Arc<Mutex<Typewriter>>,
    task: Option<JoinHandle<()>>,
    version_tx: Arc<watch::Sender<u64>>,
    version_rx: watch::Receiver<u64>,
}

impl TypewriterHandle {
    /// Start revealing `text` at `speed_ms` milliseconds per character
    pub fn spawn(text: impl Into<String>, speed_ms: u64) -> Self {
        let (version_tx, version_rx) = watch::channel(0);
        let mut handle = Self {
            typewriter: Arc::new(Mutex::new(Typewriter::new(text, speed_ms))),
            task: None,
            version_tx: Arc::new(version_tx),
            version_rx,
        };
        handle.start();
        handle
    }

    /// Replace the text; identical text leaves the running reveal untouched
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        {
            let mut typewriter = self.typewriter.lock();
            if typewriter.full_text() == text {
                return;
            }
            typewriter.set_text(text);
        }
        self.start();
    }

    /// Start the current text over from empty
    pub fn restart(&mut self) {
        self.typewriter.lock().restart();
        self.start();
    }

    /// Reveal everything now and stop ticking
    pub fn skip_to_end(&mut self) {
        self.stop();
        self.typewriter.lock().skip_to_end();
        self.version_tx.send_modify(|v| *v += 1);
    }

    /// (Re)start the ticking task for the current generation
    fn start(&mut self) {
        self.stop();
        self.version_tx.send_modify(|v| *v += 1);
        self.version_rx.borrow_and_update();

        let (tick, speed) = {
            let typewriter = self.typewriter.lock();
            if !typewriter.is_typing() {
                return;
            }
            (typewriter.tick(), typewriter.speed())
        };

        let typewriter = Arc::clone(&self.typewriter);
        let version_tx = Arc::clone(&self.version_tx);
        let first = Instant::now() + speed;

        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first, speed);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

            loop {
                interval.tick().await;
                let still_typing = {
                    let mut typewriter = typewriter.lock();
                    if !typewriter.apply_tick(tick) {
                        break;
                    }
                    typewriter.is_typing()
                };
                version_tx.send_modify(|v| *v += 1);
                if !still_typing {
                    break;
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Snapshot of the revealed prefix
    #[must_use]
    pub fn displayed_text(&self) -> String {
        self.typewriter.lock().displayed_text().to_string()
    }

    /// Whether characters remain hidden
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typewriter.lock().is_typing()
    }

    /// Snapshot of the run
    #[must_use]
    pub fn state(&self) -> RevealState {
        self.typewriter.lock().state()
    }

    /// Wait for the next change to the displayed text
    ///
    /// Returns `false` without waiting when nothing is left to reveal.
    pub async fn changed(&mut self) -> bool {
        if !self.is_typing() && !self.version_rx.has_changed().unwrap_or(false) {
            return false;
        }
        self.version_rx.changed().await.is_ok()
    }

    /// Wait until the whole text is shown
    pub async fn finished(&mut self) {
        while self.is_typing() {
            if !self.changed().await {
                break;
            }
        }
    }
}

impl Drop for TypewriterHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TypewriterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypewriterHandle")
            .field("state", &self.state())
            .field("running", &self.task.is_some())
            .finish()
    }
}
