//! Animation System - Surface-Agnostic Reveal and Modal Animations
//!
//! Animation primitives that are independent of any rendering surface. The
//! core describes how much text is revealed and how open the modal is;
//! surfaces decide how to draw that.
//!
//! # Architecture
//!
//! ```text
//! Typewriter (pure state, no clock)
//!     │
//!     ├─→ advance(delta)        frame-driven, used by render loops
//!     └─→ TypewriterHandle      timer-driven, Tokio interval + RevealTick
//!
//! ModalAnimator (Closed → Opening → Open → Closing → Closed)
//!     └─→ update(now) reports Opened / Closed
//! ```
//!
//! Time is always passed in. Nothing here reads a clock except the Tokio
//! interval inside [`TypewriterHandle`].

mod driver;
mod modal;
mod typewriter;

pub use driver::TypewriterHandle;
pub use modal::{ModalAnimator, ModalState, ModalTransition};
pub use typewriter::{RevealState, RevealTick, Typewriter};
