//! Hardware abstraction traits for indicator output and button input.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`IndicatorOutput`] | Lamps and crossing-button color |
//! | [`ButtonInput`] | Physical crossing button |
//! | [`Delay`] | Async delay for embedded systems |
//!
//! # Implementation
//!
//! For testing and desktop development, use the implementations from
//! [`crate::hal`].
//!
//! # Example
//!
//! ```rust
//! use rs_crossing::traits::IndicatorOutput;
//! use rs_crossing::hal::MockLamps;
//! use rs_crossing::{Indicators, Phase};
//!
//! let mut lamps = MockLamps::new();
//! for change in Indicators::for_phase(Phase::VehicleRed, false).changes() {
//!     lamps.apply(change).unwrap();
//! }
//! assert!(lamps.current.vehicle_red);
//! assert!(lamps.current.pedestrian_green);
//! ```

use crate::indicator::IndicatorChange;

/// Sink for indicator changes.
///
/// The controller calls [`apply`](Self::apply) once per changed field, in
/// [`Indicator::ALL`](crate::Indicator::ALL) order, after every tick that
/// changed something.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use rs_crossing::traits::IndicatorOutput;
/// use rs_crossing::{IndicatorChange, IndicatorValue};
///
/// struct GpioLamps { /* pin handles */ }
///
/// impl IndicatorOutput for GpioLamps {
///     type Error = ();
///
///     fn apply(&mut self, change: IndicatorChange) -> Result<(), ()> {
///         match change.value {
///             IndicatorValue::Lamp(lit) => { /* drive the pin for change.indicator */ }
///             IndicatorValue::Color(color) => { /* set the button LED */ }
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait IndicatorOutput {
    /// Error type for output operations.
    type Error;

    /// Render a single changed field.
    fn apply(&mut self, change: IndicatorChange) -> Result<(), Self::Error>;
}

/// Physical crossing button.
///
/// Typically a GPIO pin with hardware or software debouncing.
pub trait ButtonInput {
    /// Returns true while the button is held down.
    fn is_pressed(&self) -> bool;

    /// Returns true if the button was just pressed (edge detection).
    ///
    /// Default implementation just returns `is_pressed()`.
    /// Override for proper edge detection.
    fn just_pressed(&mut self) -> bool {
        self.is_pressed()
    }
}

/// Async delay trait for embedded systems.
///
/// Used by [`SignalDriver`](crate::SignalDriver) to wait out a tick.
pub trait Delay {
    /// Delay for the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32) -> impl core::future::Future<Output = ()>;
}
