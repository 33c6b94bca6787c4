//! Network services for HTTP API and MQTT integration.
//!
//! This module provides optional connectivity for the signal controller:
//! - `web` feature: Axum-based HTTP API server with JSON endpoints
//! - `mqtt` feature: MQTT client that publishes indicator changes
//!
//! Every service works on one `SignalController` through a shared
//! `SharedSignalState<O>` wrapped in `Arc`. Exactly one ticker advances it.
//!
//! # Shared State Pattern
//!
//! ```ignore
//! use std::sync::Arc;
//! use rs_crossing::services::{run_ticker, SharedSignalState};
//!
//! // Create single shared state
//! let state = Arc::new(SharedSignalState::new(controller));
//!
//! // One ticker, any number of observers
//! tokio::spawn(run_ticker(Arc::clone(&state)));
//! let web_router = build_router(Arc::clone(&state), &web_config);
//! let mqtt_handler = MqttHandler::with_shared_state(Arc::clone(&state), mqtt_config);
//! ```

// Shared state (available when either web or mqtt is enabled)
pub mod shared;

// API types are shared between web and mqtt
pub mod api;

// Tokio tick loop
pub mod ticker;

#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "mqtt")]
pub mod mqtt;

// Physical button handler
pub mod physical;

// Re-exports
pub use api::*;
pub use physical::*;
pub use shared::*;
pub use ticker::*;

#[cfg(feature = "web")]
pub use web::*;

#[cfg(feature = "mqtt")]
pub use mqtt::*;
