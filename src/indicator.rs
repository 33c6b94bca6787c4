//! Indicator outputs and their change projection.
//!
//! The controller never renders anything. It keeps an [`Indicators`] value,
//! a snapshot of the five lamps and the crossing-button color, and after
//! each tick it diffs the new snapshot against the last one it published.
//! Only the fields that actually differ are reported as
//! [`IndicatorChange`]s.
//!
//! # Example
//!
//! ```rust
//! use rs_crossing::{Indicator, IndicatorValue, Indicators, Phase};
//!
//! let red = Indicators::for_phase(Phase::VehicleRed, false);
//! let red_yellow = Indicators::for_phase(Phase::VehicleRedYellow, false);
//!
//! let changes = red.diff(&red_yellow);
//! assert!(changes
//!     .iter()
//!     .any(|c| c.indicator == Indicator::VehicleYellow && c.value == IndicatorValue::Lamp(true)));
//! assert!(changes.iter().all(|c| c.indicator != Indicator::VehicleRed));
//! ```

use heapless::Vec as HVec;

use crate::phase::Phase;

/// One of the five signal lamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Lamp {
    /// Vehicle red.
    VehicleRed,
    /// Vehicle yellow.
    VehicleYellow,
    /// Vehicle green.
    VehicleGreen,
    /// Pedestrian red.
    PedestrianRed,
    /// Pedestrian green.
    PedestrianGreen,
}

/// Color of the crossing button.
///
/// The button lights up once a wait request has been accepted during
/// vehicle green. It is [`Inert`](Self::Inert) at every other time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ButtonColor {
    /// Resting color.
    #[default]
    Inert,
    /// A wait request was taken into account.
    Acknowledged,
}

impl ButtonColor {
    /// Returns the color name as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ButtonColor::Inert => "inert",
            ButtonColor::Acknowledged => "acknowledged",
        }
    }
}

/// Name of an observable output field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Indicator {
    /// Vehicle red lamp.
    VehicleRed,
    /// Vehicle yellow lamp.
    VehicleYellow,
    /// Vehicle green lamp.
    VehicleGreen,
    /// Pedestrian red lamp.
    PedestrianRed,
    /// Pedestrian green lamp.
    PedestrianGreen,
    /// Crossing button color.
    CrossingButton,
}

impl Indicator {
    /// Every indicator, in publication order.
    pub const ALL: [Indicator; 6] = [
        Indicator::VehicleRed,
        Indicator::VehicleYellow,
        Indicator::VehicleGreen,
        Indicator::PedestrianRed,
        Indicator::PedestrianGreen,
        Indicator::CrossingButton,
    ];

    /// Field name used in change notifications and MQTT topics.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Indicator::VehicleRed => "vehicle_red",
            Indicator::VehicleYellow => "vehicle_yellow",
            Indicator::VehicleGreen => "vehicle_green",
            Indicator::PedestrianRed => "pedestrian_red",
            Indicator::PedestrianGreen => "pedestrian_green",
            Indicator::CrossingButton => "crossing_button",
        }
    }
}

impl From<Lamp> for Indicator {
    fn from(lamp: Lamp) -> Self {
        match lamp {
            Lamp::VehicleRed => Indicator::VehicleRed,
            Lamp::VehicleYellow => Indicator::VehicleYellow,
            Lamp::VehicleGreen => Indicator::VehicleGreen,
            Lamp::PedestrianRed => Indicator::PedestrianRed,
            Lamp::PedestrianGreen => Indicator::PedestrianGreen,
        }
    }
}

/// New value of a changed indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IndicatorValue {
    /// Lamp lit (`true`) or dark (`false`).
    Lamp(bool),
    /// Crossing-button color.
    Color(ButtonColor),
}

impl IndicatorValue {
    /// Text payload: `on`/`off` for lamps, the color name for the button.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_crossing::{ButtonColor, IndicatorValue};
    ///
    /// assert_eq!(IndicatorValue::Lamp(true).as_str(), "on");
    /// assert_eq!(IndicatorValue::Color(ButtonColor::Acknowledged).as_str(), "acknowledged");
    /// ```
    pub const fn as_str(&self) -> &'static str {
        match self {
            IndicatorValue::Lamp(true) => "on",
            IndicatorValue::Lamp(false) => "off",
            IndicatorValue::Color(color) => color.as_str(),
        }
    }
}

/// A single change notification: which field, and its new value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorChange {
    /// The field that changed.
    pub indicator: Indicator,
    /// Its new value.
    pub value: IndicatorValue,
}

/// Fixed-capacity list of changes; one slot per indicator.
pub type IndicatorChanges = HVec<IndicatorChange, 6>;

/// Snapshot of every output the controller drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Indicators {
    /// Vehicle red lamp.
    pub vehicle_red: bool,
    /// Vehicle yellow lamp.
    pub vehicle_yellow: bool,
    /// Vehicle green lamp.
    pub vehicle_green: bool,
    /// Pedestrian red lamp.
    pub pedestrian_red: bool,
    /// Pedestrian green lamp.
    pub pedestrian_green: bool,
    /// Crossing-button color.
    pub button: ButtonColor,
}

impl Indicators {
    /// Projects a phase onto the lamps.
    ///
    /// `blink_off` darkens the phase's blink lamp for the current sub-step.
    /// It has no effect in phases that do not blink. The button is always
    /// [`ButtonColor::Inert`]; use [`with_button`](Self::with_button) to
    /// overlay the acknowledged color.
    pub const fn for_phase(phase: Phase, blink_off: bool) -> Self {
        let (vehicle_red, vehicle_yellow, vehicle_green, pedestrian_red, pedestrian_green) =
            match phase {
                Phase::Off => (false, false, false, false, false),
                Phase::VehicleRed => (true, false, false, false, true),
                Phase::PedestrianBlinkWarning => (true, false, false, false, !blink_off),
                Phase::VehicleRedYellow => (true, true, false, true, false),
                Phase::VehicleGreen => (false, false, true, true, false),
                Phase::PedestrianBlinkEnd => (false, false, !blink_off, true, false),
                Phase::VehicleYellow => (false, true, false, true, false),
            };

        Self {
            vehicle_red,
            vehicle_yellow,
            vehicle_green,
            pedestrian_red,
            pedestrian_green,
            button: ButtonColor::Inert,
        }
    }

    /// Returns a copy with the given button color.
    pub const fn with_button(mut self, button: ButtonColor) -> Self {
        self.button = button;
        self
    }

    /// Returns whether a lamp is lit.
    pub const fn lamp(&self, lamp: Lamp) -> bool {
        match lamp {
            Lamp::VehicleRed => self.vehicle_red,
            Lamp::VehicleYellow => self.vehicle_yellow,
            Lamp::VehicleGreen => self.vehicle_green,
            Lamp::PedestrianRed => self.pedestrian_red,
            Lamp::PedestrianGreen => self.pedestrian_green,
        }
    }

    /// Returns the value of any indicator.
    pub const fn get(&self, indicator: Indicator) -> IndicatorValue {
        match indicator {
            Indicator::VehicleRed => IndicatorValue::Lamp(self.vehicle_red),
            Indicator::VehicleYellow => IndicatorValue::Lamp(self.vehicle_yellow),
            Indicator::VehicleGreen => IndicatorValue::Lamp(self.vehicle_green),
            Indicator::PedestrianRed => IndicatorValue::Lamp(self.pedestrian_red),
            Indicator::PedestrianGreen => IndicatorValue::Lamp(self.pedestrian_green),
            Indicator::CrossingButton => IndicatorValue::Color(self.button),
        }
    }

    /// Write a single change into the snapshot.
    ///
    /// A value of the wrong kind for the indicator (a color for a lamp, or
    /// the reverse) is ignored.
    pub fn set(&mut self, change: IndicatorChange) {
        match (change.indicator, change.value) {
            (Indicator::VehicleRed, IndicatorValue::Lamp(lit)) => self.vehicle_red = lit,
            (Indicator::VehicleYellow, IndicatorValue::Lamp(lit)) => self.vehicle_yellow = lit,
            (Indicator::VehicleGreen, IndicatorValue::Lamp(lit)) => self.vehicle_green = lit,
            (Indicator::PedestrianRed, IndicatorValue::Lamp(lit)) => self.pedestrian_red = lit,
            (Indicator::PedestrianGreen, IndicatorValue::Lamp(lit)) => self.pedestrian_green = lit,
            (Indicator::CrossingButton, IndicatorValue::Color(color)) => self.button = color,
            _ => {}
        }
    }

    /// Changes needed to go from `self` to `next`, in [`Indicator::ALL`] order.
    pub fn diff(&self, next: &Indicators) -> IndicatorChanges {
        let mut changes = IndicatorChanges::new();
        for indicator in Indicator::ALL {
            let value = next.get(indicator);
            if self.get(indicator) != value {
                // Capacity equals Indicator::ALL.len()
                let _ = changes.push(IndicatorChange { indicator, value });
            }
        }
        changes
    }

    /// Every field as a change, for a full resync of an observer.
    pub fn changes(&self) -> IndicatorChanges {
        let mut changes = IndicatorChanges::new();
        for indicator in Indicator::ALL {
            let _ = changes.push(IndicatorChange {
                indicator,
                value: self.get(indicator),
            });
        }
        changes
    }
}
