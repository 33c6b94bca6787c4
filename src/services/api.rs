//! API request and response types for HTTP/MQTT communication.

use serde::{Deserialize, Serialize};

use crate::{ButtonColor, CommandOutcome, Indicators, Phase, SignalState};

// ============================================================================
// Response Types
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present when success=false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Lamp states and button color, flattened for clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorsResponse {
    /// Vehicle red lamp
    pub vehicle_red: bool,
    /// Vehicle yellow lamp
    pub vehicle_yellow: bool,
    /// Vehicle green lamp
    pub vehicle_green: bool,
    /// Pedestrian red lamp
    pub pedestrian_red: bool,
    /// Pedestrian green lamp
    pub pedestrian_green: bool,
    /// Crossing button color
    pub crossing_button: ButtonColor,
}

impl From<&Indicators> for IndicatorsResponse {
    fn from(lamps: &Indicators) -> Self {
        Self {
            vehicle_red: lamps.vehicle_red,
            vehicle_yellow: lamps.vehicle_yellow,
            vehicle_green: lamps.vehicle_green,
            pedestrian_red: lamps.pedestrian_red,
            pedestrian_green: lamps.pedestrian_green,
            crossing_button: lamps.button,
        }
    }
}

/// Current signal state response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    /// Active phase
    pub phase: Phase,
    /// Lamp states and button color
    pub indicators: IndicatorsResponse,
    /// Milliseconds until the next transition
    pub remaining_ms: u32,
    /// Current tick interval
    pub interval_ms: u32,
    /// Completed cycles
    pub cycle: u32,
    /// Whether a wait request would be accepted now
    pub can_request_wait: bool,
    /// Whether a wait request is waiting for the next tick
    pub wait_pending: bool,
    /// Progress through the phase (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f32>,
}

impl From<&SignalState> for StateResponse {
    fn from(state: &SignalState) -> Self {
        Self {
            phase: state.phase,
            indicators: IndicatorsResponse::from(&state.indicators),
            remaining_ms: state.remaining_ms,
            interval_ms: state.interval_ms,
            cycle: state.cycle,
            can_request_wait: state.can_request_wait,
            wait_pending: state.wait_pending,
            percent: state.progress.percent(),
        }
    }
}

/// Command result response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Whether the command was accepted
    pub accepted: bool,
    /// Result details
    pub result: String,
}

impl CommandResponse {
    /// Create a response for an accepted command
    pub fn accepted(result: impl Into<String>) -> Self {
        Self {
            accepted: true,
            result: result.into(),
        }
    }

    /// Create a response for a rejected command
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            result: reason.into(),
        }
    }
}

impl From<CommandOutcome> for CommandResponse {
    fn from(outcome: CommandOutcome) -> Self {
        if outcome.is_accepted() {
            Self::accepted(outcome.as_str())
        } else {
            Self::rejected(outcome.as_str())
        }
    }
}
