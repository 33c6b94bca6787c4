//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `log`: Indicator output that logs through `tracing`

pub mod log;
pub mod mock;

pub use log::*;
pub use mock::*;
