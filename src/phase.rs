//! Signal phases and their static configuration.
//!
//! A [`Phase`] is one named segment of the signal cycle. The cycle starts in
//! [`Phase::Off`] exactly once and then loops through the remaining six
//! phases forever:
//!
//! ```text
//! Off -> VehicleRed -> PedestrianBlinkWarning -> VehicleRedYellow
//!     -> VehicleGreen -> PedestrianBlinkEnd -> VehicleYellow -> VehicleRed ...
//! ```
//!
//! Durations and tick intervals live in [`TimingConfig`](crate::TimingConfig),
//! which turns a phase into a [`PhaseConfig`].

use crate::indicator::{Indicators, Lamp};

/// One segment of the traffic-light cycle.
///
/// # Default
///
/// Defaults to [`Off`](Self::Off), the one-shot start-up phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    /// All lamps dark. Entered once at start-up and never again.
    #[default]
    Off,
    /// Vehicles stop, pedestrians walk.
    VehicleRed,
    /// Pedestrian green blinks to warn that the crossing is closing.
    PedestrianBlinkWarning,
    /// Vehicle red and yellow together, pedestrians stopped.
    VehicleRedYellow,
    /// Vehicles go. The only phase that accepts wait requests.
    VehicleGreen,
    /// Vehicle green blinks before yellow.
    PedestrianBlinkEnd,
    /// Vehicles prepare to stop.
    VehicleYellow,
}

impl Phase {
    /// The repeating part of the cycle, in order, starting at vehicle red.
    pub const CYCLE: [Phase; 6] = [
        Phase::VehicleRed,
        Phase::PedestrianBlinkWarning,
        Phase::VehicleRedYellow,
        Phase::VehicleGreen,
        Phase::PedestrianBlinkEnd,
        Phase::VehicleYellow,
    ];

    /// Returns the phase that follows this one.
    ///
    /// The mapping is total: every phase has exactly one successor and
    /// nothing leads back to [`Off`](Self::Off).
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_crossing::Phase;
    ///
    /// assert_eq!(Phase::Off.next(), Phase::VehicleRed);
    /// assert_eq!(Phase::VehicleYellow.next(), Phase::VehicleRed);
    /// ```
    pub const fn next(self) -> Self {
        match self {
            Phase::Off => Phase::VehicleRed,
            Phase::VehicleRed => Phase::PedestrianBlinkWarning,
            Phase::PedestrianBlinkWarning => Phase::VehicleRedYellow,
            Phase::VehicleRedYellow => Phase::VehicleGreen,
            Phase::VehicleGreen => Phase::PedestrianBlinkEnd,
            Phase::PedestrianBlinkEnd => Phase::VehicleYellow,
            Phase::VehicleYellow => Phase::VehicleRed,
        }
    }

    /// Returns the phase name as a snake_case string.
    ///
    /// Used for log fields, MQTT payloads and JSON.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Phase::Off => "off",
            Phase::VehicleRed => "vehicle_red",
            Phase::PedestrianBlinkWarning => "pedestrian_blink_warning",
            Phase::VehicleRedYellow => "vehicle_red_yellow",
            Phase::VehicleGreen => "vehicle_green",
            Phase::PedestrianBlinkEnd => "pedestrian_blink_end",
            Phase::VehicleYellow => "vehicle_yellow",
        }
    }

    /// Returns true for the two phases that run on the fast blink interval.
    #[inline]
    pub const fn is_blinking(&self) -> bool {
        matches!(self, Phase::PedestrianBlinkWarning | Phase::PedestrianBlinkEnd)
    }

    /// The lamp that alternates on every sub-tick, if this phase blinks.
    pub const fn blink_lamp(&self) -> Option<Lamp> {
        match self {
            Phase::PedestrianBlinkWarning => Some(Lamp::PedestrianGreen),
            Phase::PedestrianBlinkEnd => Some(Lamp::VehicleGreen),
            _ => None,
        }
    }
}

/// Static configuration of a single phase.
///
/// Built by [`TimingConfig::phase_config`](crate::TimingConfig::phase_config).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseConfig {
    /// The phase this configuration describes.
    pub phase: Phase,
    /// Nominal duration in milliseconds.
    pub duration_ms: u32,
    /// Tick interval to run while in this phase.
    pub interval_ms: u32,
    /// Lamp snapshot applied on entry.
    pub entry: Indicators,
    /// Lamp that blinks during the phase, if any.
    pub blink: Option<Lamp>,
}
