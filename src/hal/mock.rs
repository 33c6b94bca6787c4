//! Mock implementations for testing without hardware.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockLamps`] | [`IndicatorOutput`] | Records every change and the resulting snapshot |
//! | [`MockButton`] | [`ButtonInput`] | Scripted button presses |
//! | [`MockDelay`] | [`Delay`] | Returns immediately, records requested delays |
//!
//! # Example
//!
//! ```rust
//! use rs_crossing::{SignalController, Phase, hal::MockLamps};
//!
//! let mut controller = SignalController::new(MockLamps::new());
//! for _ in 0..3 {
//!     controller.tick().unwrap();
//! }
//!
//! // Verify via the mock
//! let lamps = controller.output();
//! assert_eq!(lamps.current, controller.indicators());
//! assert_eq!(lamps.changes.len(), 2);
//! ```
//!
//! [`IndicatorOutput`]: crate::traits::IndicatorOutput
//! [`ButtonInput`]: crate::traits::ButtonInput
//! [`Delay`]: crate::traits::Delay

use alloc::vec::Vec;

use crate::indicator::{IndicatorChange, Indicators};
use crate::traits::{ButtonInput, Delay, IndicatorOutput};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock indicator output for testing.
///
/// Records all changes for verification and keeps the snapshot they add up
/// to. Set `fail` to make every `apply` return `Err(())` without recording.
///
/// # Example
///
/// ```rust
/// use rs_crossing::hal::MockLamps;
/// use rs_crossing::traits::IndicatorOutput;
/// use rs_crossing::{Indicator, IndicatorChange, IndicatorValue};
///
/// let mut lamps = MockLamps::new();
/// let change = IndicatorChange {
///     indicator: Indicator::VehicleYellow,
///     value: IndicatorValue::Lamp(true),
/// };
/// lamps.apply(change).unwrap();
///
/// assert!(lamps.current.vehicle_yellow);
/// assert_eq!(lamps.changes, vec![change]);
///
/// lamps.fail = true;
/// assert!(lamps.apply(change).is_err());
/// assert_eq!(lamps.changes.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockLamps {
    /// Every change applied, in order.
    pub changes: Vec<IndicatorChange>,
    /// Snapshot built from the applied changes.
    pub current: Indicators,
    /// When true, `apply` fails.
    pub fail: bool,
}

impl MockLamps {
    /// Creates a new mock with all lamps dark.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that rejects every change.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Forget recorded changes, keeping the current snapshot.
    pub fn clear(&mut self) {
        self.changes.clear();
    }
}

impl IndicatorOutput for MockLamps {
    type Error = ();

    fn apply(&mut self, change: IndicatorChange) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.current.set(change);
        self.changes.push(change);
        Ok(())
    }
}

/// Mock crossing button for testing.
///
/// # Example
///
/// ```rust
/// use rs_crossing::hal::MockButton;
/// use rs_crossing::traits::ButtonInput;
///
/// let mut button = MockButton::new();
///
/// button.press();
/// assert!(button.just_pressed()); // Once
/// assert!(!button.just_pressed()); // Consumed
/// assert!(button.is_pressed()); // Still held
///
/// button.release();
/// assert!(!button.is_pressed());
/// ```
#[derive(Debug, Default)]
pub struct MockButton {
    held: bool,
    edge: bool,
}

impl MockButton {
    /// Creates a released button.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the held state without producing an edge.
    pub fn set_held(&mut self, held: bool) {
        self.held = held;
    }

    /// Simulate a press (just_pressed will be true once)
    pub fn press(&mut self) {
        self.held = true;
        self.edge = true;
    }

    /// Let go of the button.
    pub fn release(&mut self) {
        self.held = false;
    }
}

impl ButtonInput for MockButton {
    fn is_pressed(&self) -> bool {
        self.held
    }

    fn just_pressed(&mut self) -> bool {
        let edge = self.edge;
        self.edge = false;
        edge
    }
}

/// Mock delay that completes immediately.
///
/// Records every requested duration, so a test can check the sequence of
/// tick intervals a driver asked for.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Requested delays in milliseconds, in order.
    pub delays: Vec<u32>,
}

impl MockDelay {
    /// Creates a mock with no recorded delays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all requested delays.
    pub fn total_ms(&self) -> u64 {
        self.delays.iter().map(|ms| u64::from(*ms)).sum()
    }
}

impl Delay for MockDelay {
    async fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }
}

// ============================================================================
// Tests
// ============================================================================
