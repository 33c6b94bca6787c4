//! # rs-crossing
//!
//! A traffic light coupled to a pedestrian crossing, driven by one timed
//! state machine, with optional web UI and MQTT observers.
//!
//! ## Features
//!
//! - **Tick-driven core**: the controller never sleeps; callers feed it ticks
//! - **Blink sub-stepping**: blinking phases run on a half-length interval
//! - **Wait requests**: a single-shot flag that cuts vehicle green short
//! - **Change projection**: only indicators that actually changed are published
//! - **Hardware abstraction**: lamps and button behind traits, mocks for tests
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `phase` - The seven phases and their order
//! - `indicator` - Lamp snapshot, projection and diffing
//! - `timing` - Countdown engine
//! - `controller` - Main state machine that ties everything together
//! - `driver` - Async tick loop over a `Delay`
//! - `traits` - Hardware abstractions
//! - `hal` - Concrete implementations (mock for testing, log for desktop)
//!
//! ## Example
//!
//! ```rust
//! use rs_crossing::{SignalController, CommandSource, Phase, hal::MockLamps};
//!
//! let mut controller = SignalController::new(MockLamps::new());
//!
//! // Drive it from your own timer, one tick per tick_interval_ms()
//! while controller.phase() != Phase::VehicleGreen {
//!     controller.tick().unwrap();
//! }
//!
//! // A pedestrian presses the button
//! assert!(controller.request_wait(CommandSource::Button).is_accepted());
//! controller.tick().unwrap();
//! assert_eq!(controller.remaining_ms(), 2000);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Command sources and outcomes for wait requests.
pub mod commands;
/// Main signal controller that coordinates phases, timing, and outputs.
pub mod controller;
/// Async tick loop for targets without an OS timer.
pub mod driver;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Indicator snapshot, projection, and change diffing.
pub mod indicator;
/// Signal phases and their static configuration.
pub mod phase;
/// Countdown engine and phase progress.
pub mod timing;
/// Core traits for hardware abstraction.
pub mod traits;
/// Single-shot wait request flag.
pub mod wait;

/// Shared configuration for timing and services.
pub mod config;

/// Network services for HTTP API and MQTT (feature-gated).
#[cfg(any(feature = "web", feature = "mqtt"))]
pub mod services;

// Re-exports for convenience
pub use commands::{CommandOutcome, CommandSource, RejectReason};
pub use controller::{SignalController, SignalState};
pub use driver::SignalDriver;
pub use indicator::{
    ButtonColor, Indicator, IndicatorChange, IndicatorChanges, IndicatorValue, Indicators, Lamp,
};
pub use phase::{Phase, PhaseConfig};
pub use timing::{Countdown, PhaseProgress, TickOutcome};
pub use traits::{ButtonInput, Delay, IndicatorOutput};
pub use wait::WaitRequest;

// Config re-exports
pub use config::{Config, ConfigError, MqttConfig, TimingConfig, WebConfig};
