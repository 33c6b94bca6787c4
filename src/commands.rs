//! Command sources and outcomes for the crossing button.
//!
//! The controller accepts a single command, a wait request. Each request
//! carries the [`CommandSource`] it came from so logs and API responses can
//! tell a physical press from a remote one.
//!
//! # Example
//!
//! ```rust
//! use rs_crossing::{CommandOutcome, CommandSource, RejectReason, SignalController};
//! use rs_crossing::hal::MockLamps;
//!
//! let controller = SignalController::new(MockLamps::new());
//!
//! // The controller starts in `Off`, so the press is ignored
//! let outcome = controller.request_wait(CommandSource::Button);
//! assert_eq!(outcome, CommandOutcome::Ignored(RejectReason::NotVehicleGreen));
//! ```

/// Where a wait request originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CommandSource {
    /// Physical crossing button.
    Button,
    /// HTTP API.
    WebApi,
    /// MQTT message.
    Mqtt,
}

impl CommandSource {
    /// Returns the source as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CommandSource::Button => "button",
            CommandSource::WebApi => "web_api",
            CommandSource::Mqtt => "mqtt",
        }
    }
}

/// Why a wait request was not taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RejectReason {
    /// Requests only count while vehicles have green.
    NotVehicleGreen,
}

/// Result of a wait request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CommandOutcome {
    /// The request is pending and will be applied on the next tick.
    Accepted,
    /// Nothing changed.
    Ignored(RejectReason),
}

impl CommandOutcome {
    /// Returns true for [`Accepted`](Self::Accepted).
    #[inline]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, CommandOutcome::Accepted)
    }

    /// Short status string for API responses and MQTT payloads.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CommandOutcome::Accepted => "accepted",
            CommandOutcome::Ignored(RejectReason::NotVehicleGreen) => "ignored_not_vehicle_green",
        }
    }
}
