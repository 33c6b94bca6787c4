//! Physical input handler for the crossing button.
//!
//! # Usage
//!
//! ```ignore
//! use rs_crossing::services::{PhysicalInputHandler, SharedSignalState};
//! use rs_crossing::hal::MockButton;
//!
//! let state = Arc::new(SharedSignalState::new(controller));
//! let mut handler = PhysicalInputHandler::new(Arc::clone(&state), MockButton::new());
//!
//! // In your input loop:
//! handler.poll();
//! ```

use crate::traits::ButtonInput;
use crate::{CommandOutcome, CommandSource};

use super::shared::StateProvider;

/// Handler for the physical crossing button.
///
/// Polls the button and forwards each press to the controller behind `S`
/// as a `CommandSource::Button` wait request.
pub struct PhysicalInputHandler<S: StateProvider, B: ButtonInput> {
    /// Where wait requests go
    state: S,
    /// The button input device
    button: B,
}

impl<S: StateProvider, B: ButtonInput> PhysicalInputHandler<S, B> {
    /// Create a new physical input handler.
    pub fn new(state: S, button: B) -> Self {
        Self { state, button }
    }

    /// Poll the button and forward a press.
    ///
    /// Call this frequently (e.g., every 10-20ms). Returns the outcome of the
    /// wait request if the button was pressed since the last poll.
    pub fn poll(&mut self) -> Option<CommandOutcome> {
        if !self.button.just_pressed() {
            return None;
        }
        let outcome = self.state.request_wait(CommandSource::Button);
        tracing::debug!(
            outcome = outcome.as_str(),
            at_ms = self.state.now_ms(),
            "crossing button pressed"
        );
        Some(outcome)
    }

    /// Get a reference to the state the handler forwards to.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Get a reference to the button.
    pub fn button(&self) -> &B {
        &self.button
    }

    /// Get a mutable reference to the button.
    pub fn button_mut(&mut self) -> &mut B {
        &mut self.button
    }
}
