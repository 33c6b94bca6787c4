//! Countdown engine for the active phase.
//!
//! [`Countdown`] turns ticks into elapsed time. Every tick is assumed to be
//! exactly one interval long; the interval itself belongs to the phase and
//! changes only when a new phase is entered.
//!
//! Time is kept in whole milliseconds so that sub-ticks of half a unit
//! accumulate without rounding drift over an unbounded number of cycles.

use crate::phase::Phase;

/// Result of advancing the countdown by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time remains in the current phase.
    Running,
    /// The phase is over and the controller must transition.
    Expired,
}

/// Remaining time of the current phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining_ms: u32,
    interval_ms: u32,
    elapsed_ms: u32,
}

impl Countdown {
    /// Create a countdown of `duration_ms` driven by ticks of `interval_ms`.
    pub const fn new(duration_ms: u32, interval_ms: u32) -> Self {
        Self {
            remaining_ms: duration_ms,
            interval_ms,
            elapsed_ms: 0,
        }
    }

    /// Start over for a newly entered phase.
    pub fn restart(&mut self, duration_ms: u32, interval_ms: u32) {
        *self = Self::new(duration_ms, interval_ms);
    }

    /// Consume one tick.
    ///
    /// A countdown already at zero expires without consuming any time. A
    /// tick longer than the remaining time expires and the overshoot is
    /// dropped rather than carried into the next phase.
    pub fn advance(&mut self) -> TickOutcome {
        if self.remaining_ms == 0 {
            return TickOutcome::Expired;
        }

        let step = self.interval_ms.min(self.remaining_ms);
        self.remaining_ms -= step;
        self.elapsed_ms = self.elapsed_ms.saturating_add(step);

        if self.remaining_ms == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running
        }
    }

    /// Consume one tick by replacing the remaining time instead of
    /// decrementing it.
    pub fn override_remaining(&mut self, remaining_ms: u32) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(self.interval_ms);
        self.remaining_ms = remaining_ms;
    }

    /// Milliseconds left in the phase.
    #[inline]
    pub const fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    /// Length of one tick in the current phase.
    #[inline]
    pub const fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Milliseconds spent in the phase so far.
    #[inline]
    pub const fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// Returns true once no time remains.
    #[inline]
    pub const fn is_expired(&self) -> bool {
        self.remaining_ms == 0
    }
}

/// Progress through the active phase, for UI and API consumers.
///
/// # Example
///
/// ```rust
/// use rs_crossing::{Phase, PhaseProgress};
///
/// let progress = PhaseProgress {
///     phase: Phase::VehicleGreen,
///     elapsed_ms: 2000,
///     total_ms: 8000,
/// };
/// assert_eq!(progress.percent(), Some(0.25));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseProgress {
    /// Phase being timed.
    pub phase: Phase,
    /// Time spent in the phase.
    pub elapsed_ms: u32,
    /// Elapsed plus remaining time. Grows or shrinks after a wait override.
    pub total_ms: u32,
}

impl PhaseProgress {
    /// Fraction of the phase completed, `None` for zero-length phases.
    pub fn percent(&self) -> Option<f32> {
        if self.total_ms == 0 {
            None
        } else {
            Some(self.elapsed_ms as f32 / self.total_ms as f32)
        }
    }

    /// Milliseconds left.
    pub fn remaining_ms(&self) -> u32 {
        self.total_ms.saturating_sub(self.elapsed_ms)
    }
}
