//! Trait definitions for the hardware the controller drives and reads.
//!
//! This module defines the abstractions that let rs-crossing run against
//! test doubles, a logging backend on desktop, or real lamp drivers.
//!
//! # Hardware Abstraction
//!
//! - [`IndicatorOutput`]: Receives lamp and button-color changes
//! - [`ButtonInput`]: The physical crossing button
//! - [`Delay`]: Async wait between ticks

pub mod hardware;

pub use hardware::*;
