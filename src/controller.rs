//! Main signal controller that ties everything together.
//!
//! This module provides [`SignalController`], the state machine that owns
//! the active phase and its countdown and drives an [`IndicatorOutput`].
//!
//! # Overview
//!
//! The controller:
//! - Advances the countdown by exactly one interval per [`tick`](SignalController::tick)
//! - Transitions to the next phase when the countdown expires
//! - Flips the blink lamp on each sub-tick of a blinking phase
//! - Applies a pending wait request while vehicles have green
//! - Pushes only the changed indicators to its output
//!
//! It never sleeps or spawns anything. A driver (the async
//! [`SignalDriver`](crate::SignalDriver), the tokio ticker in `services`, or
//! a test) calls `tick()` once per [`tick_interval_ms`](SignalController::tick_interval_ms).
//!
//! # Example
//!
//! ```rust
//! use rs_crossing::{SignalController, Phase, hal::MockLamps};
//!
//! let mut controller = SignalController::new(MockLamps::new());
//!
//! // Three seconds of darkness, then vehicle red
//! for _ in 0..3 {
//!     controller.tick().unwrap();
//! }
//! assert_eq!(controller.phase(), Phase::VehicleRed);
//!
//! let lamps = controller.indicators();
//! assert!(lamps.vehicle_red);
//! assert!(lamps.pedestrian_green);
//! assert!(!lamps.pedestrian_red);
//! ```
//!
//! # Wait Requests
//!
//! ```rust
//! use rs_crossing::{SignalController, CommandSource, ButtonColor, Phase, hal::MockLamps};
//!
//! let mut controller = SignalController::new(MockLamps::new());
//! while controller.phase() != Phase::VehicleGreen {
//!     controller.tick().unwrap();
//! }
//!
//! assert!(controller.request_wait(CommandSource::Button).is_accepted());
//! controller.tick().unwrap();
//!
//! assert_eq!(controller.remaining_ms(), 2000);
//! assert_eq!(controller.indicators().button, ButtonColor::Acknowledged);
//! ```

use crate::commands::{CommandOutcome, CommandSource, RejectReason};
use crate::config::{ConfigError, TimingConfig};
use crate::indicator::{ButtonColor, Indicators};
use crate::phase::Phase;
use crate::timing::{Countdown, PhaseProgress, TickOutcome};
use crate::traits::IndicatorOutput;
use crate::wait::WaitRequest;

/// Traffic-light and pedestrian-crossing state machine.
///
/// # Type Parameter
///
/// - `O`: The indicator output implementation ([`IndicatorOutput`] trait)
///
/// # Thread Safety
///
/// The controller itself is not thread-safe and is meant to be ticked from
/// a single flow of control. Wait requests can come from anywhere through
/// a [`WaitRequest`] handle (see [`wait_handle`](Self::wait_handle)). For
/// sharing the whole controller with a web server or MQTT client, use the
/// `SharedSignalState` wrapper from the services module (requires `web` or
/// `mqtt` feature).
pub struct SignalController<O: IndicatorOutput> {
    output: O,
    timing: TimingConfig,
    phase: Phase,
    countdown: Countdown,
    blink_off: bool,
    button: ButtonColor,
    wait: WaitRequest,
    published: Indicators,
    cycle: u32,
    ticks: u64,
}

impl<O: IndicatorOutput> SignalController<O> {
    /// Create a controller with the default timing, starting in [`Phase::Off`].
    ///
    /// The output is assumed to start dark, which is what `Off` shows, so
    /// nothing is applied until the first change. Call
    /// [`resync`](Self::resync) to push the full state anyway.
    pub fn new(output: O) -> Self {
        Self::build(output, TimingConfig::default())
    }

    /// Create a controller with custom timing.
    pub fn with_timing(output: O, timing: TimingConfig) -> Result<Self, ConfigError> {
        timing.validate()?;
        Ok(Self::build(output, timing))
    }

    fn build(output: O, timing: TimingConfig) -> Self {
        let off = timing.phase_config(Phase::Off, true);
        Self {
            output,
            timing,
            phase: Phase::Off,
            countdown: Countdown::new(off.duration_ms, off.interval_ms),
            blink_off: false,
            button: ButtonColor::Inert,
            wait: WaitRequest::new(),
            published: off.entry,
            cycle: 0,
            ticks: 0,
        }
    }

    /// Consume one tick. Call every [`tick_interval_ms`](Self::tick_interval_ms).
    ///
    /// The wait flag is read and reset on every tick. Outside vehicle green
    /// a pending request is discarded.
    pub fn tick(&mut self) -> Result<(), O::Error> {
        self.ticks = self.ticks.wrapping_add(1);
        let wait_requested = self.wait.take();

        if self.phase == Phase::VehicleGreen && wait_requested {
            self.countdown
                .override_remaining(self.timing.wait_extension_ms);
            self.button = ButtonColor::Acknowledged;
            tracing::debug!(
                remaining_ms = self.countdown.remaining_ms(),
                "wait request applied"
            );
        } else {
            if wait_requested {
                tracing::debug!(phase = self.phase.as_str(), "wait request discarded");
            }
            match self.countdown.advance() {
                TickOutcome::Running => {
                    if self.phase.is_blinking() {
                        self.blink_off = !self.blink_off;
                    }
                }
                TickOutcome::Expired => self.advance_phase(),
            }
        }

        self.publish()
    }

    fn advance_phase(&mut self) {
        if self.phase == Phase::VehicleYellow {
            self.cycle = self.cycle.wrapping_add(1);
        }
        self.enter(self.phase.next());
    }

    fn enter(&mut self, phase: Phase) {
        let config = self.timing.phase_config(phase, self.is_first_cycle());
        self.phase = phase;
        self.countdown.restart(config.duration_ms, config.interval_ms);
        self.blink_off = false;
        self.button = ButtonColor::Inert;
        self.wait.clear();

        tracing::info!(
            phase = phase.as_str(),
            duration_ms = config.duration_ms,
            interval_ms = config.interval_ms,
            cycle = self.cycle,
            "entering phase"
        );
    }

    fn publish(&mut self) -> Result<(), O::Error> {
        let next = self.indicators();
        for change in self.published.diff(&next) {
            self.output.apply(change)?;
        }
        self.published = next;
        Ok(())
    }

    /// Push every indicator to the output, changed or not.
    pub fn resync(&mut self) -> Result<(), O::Error> {
        let current = self.indicators();
        for change in current.changes() {
            self.output.apply(change)?;
        }
        self.published = current;
        Ok(())
    }

    /// Request that the green phase be cut down to the wait extension.
    ///
    /// Only accepted during [`Phase::VehicleGreen`]; the request is applied
    /// on the next tick. Repeated requests before that tick merge into one.
    pub fn request_wait(&self, source: CommandSource) -> CommandOutcome {
        if self.can_request_wait() {
            self.wait.request();
            tracing::debug!(source = source.as_str(), "wait request accepted");
            CommandOutcome::Accepted
        } else {
            tracing::debug!(
                source = source.as_str(),
                phase = self.phase.as_str(),
                "wait request ignored"
            );
            CommandOutcome::Ignored(RejectReason::NotVehicleGreen)
        }
    }

    /// True only while vehicles have green.
    pub fn can_request_wait(&self) -> bool {
        self.phase == Phase::VehicleGreen
    }

    /// Shared handle to the wait flag, for inputs that live on another thread.
    ///
    /// Setting the flag directly skips the phase check; a request set
    /// outside vehicle green is discarded on the next tick.
    pub fn wait_handle(&self) -> WaitRequest {
        self.wait.clone()
    }

    /// Get the current state for UI/API
    pub fn state(&self) -> SignalState {
        SignalState {
            phase: self.phase,
            indicators: self.indicators(),
            remaining_ms: self.countdown.remaining_ms(),
            interval_ms: self.countdown.interval_ms(),
            cycle: self.cycle,
            ticks: self.ticks,
            wait_pending: self.wait.is_pending(),
            can_request_wait: self.can_request_wait(),
            progress: self.progress(),
        }
    }

    /// Progress through the active phase.
    pub fn progress(&self) -> PhaseProgress {
        PhaseProgress {
            phase: self.phase,
            elapsed_ms: self.countdown.elapsed_ms(),
            total_ms: self
                .countdown
                .elapsed_ms()
                .saturating_add(self.countdown.remaining_ms()),
        }
    }

    /// Current lamp and button snapshot.
    pub fn indicators(&self) -> Indicators {
        Indicators::for_phase(self.phase, self.blink_off).with_button(self.button)
    }

    /// Get the active phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Milliseconds left before the next transition
    pub fn remaining_ms(&self) -> u32 {
        self.countdown.remaining_ms()
    }

    /// Interval until the next tick is due
    pub fn tick_interval_ms(&self) -> u32 {
        self.countdown.interval_ms()
    }

    /// Completed passes through vehicle yellow
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// True until the first vehicle yellow has ended
    pub fn is_first_cycle(&self) -> bool {
        self.cycle == 0
    }

    /// Ticks consumed since start-up
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Timing in effect
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Borrow the output
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Mutably borrow the output
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}

/// Full state snapshot for UI/API.
///
/// Implements `serde::Serialize` when the `serde` feature is enabled for
/// easy JSON serialization.
///
/// # Example
///
/// ```rust
/// use rs_crossing::{SignalController, Phase, hal::MockLamps};
///
/// let controller = SignalController::new(MockLamps::new());
///
/// let state = controller.state();
/// assert_eq!(state.phase, Phase::Off);
/// assert_eq!(state.remaining_ms, 3000);
/// assert!(!state.can_request_wait);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalState {
    /// Active phase.
    pub phase: Phase,
    /// Lamps and button color.
    pub indicators: Indicators,
    /// Milliseconds left in the phase.
    pub remaining_ms: u32,
    /// Current tick interval.
    pub interval_ms: u32,
    /// Completed cycles.
    pub cycle: u32,
    /// Ticks consumed since start-up.
    pub ticks: u64,
    /// A wait request is waiting for the next tick.
    pub wait_pending: bool,
    /// Whether a wait request would be accepted right now.
    pub can_request_wait: bool,
    /// Progress through the active phase.
    pub progress: PhaseProgress,
}

impl Default for SignalState {
    fn default() -> Self {
        let timing = TimingConfig::default();
        Self {
            phase: Phase::Off,
            indicators: Indicators::default(),
            remaining_ms: timing.off_ms,
            interval_ms: timing.tick_ms,
            cycle: 0,
            ticks: 0,
            wait_pending: false,
            can_request_wait: false,
            progress: PhaseProgress {
                phase: Phase::Off,
                elapsed_ms: 0,
                total_ms: timing.off_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockLamps;
    use crate::indicator::{Indicator, IndicatorValue};

    fn controller() -> SignalController<MockLamps> {
        SignalController::new(MockLamps::new())
    }

    fn run_until(controller: &mut SignalController<MockLamps>, phase: Phase) -> usize {
        let mut ticks = 0;
        while controller.phase() != phase {
            controller.tick().unwrap();
            ticks += 1;
            assert!(ticks < 100, "never reached {phase:?}");
        }
        ticks
    }

    #[test]
    fn starts_off_and_dark() {
        let controller = controller();
        assert_eq!(controller.phase(), Phase::Off);
        assert_eq!(controller.remaining_ms(), 3000);
        assert_eq!(controller.indicators(), Indicators::default());
        assert!(controller.output().changes.is_empty());
    }

    #[test]
    fn off_lasts_three_ticks() {
        let mut controller = controller();
        controller.tick().unwrap();
        controller.tick().unwrap();
        assert_eq!(controller.phase(), Phase::Off);
        controller.tick().unwrap();
        assert_eq!(controller.phase(), Phase::VehicleRed);
        assert_eq!(controller.remaining_ms(), 10_000);
    }

    #[test]
    fn only_changed_indicators_are_published() {
        let mut controller = controller();
        run_until(&mut controller, Phase::VehicleRed);

        // Off -> VehicleRed lights two lamps
        let changes = &controller.output().changes;
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].indicator, Indicator::VehicleRed);
        assert_eq!(changes[1].indicator, Indicator::PedestrianGreen);

        // A plain tick inside a phase publishes nothing
        controller.output_mut().changes.clear();
        controller.tick().unwrap();
        assert!(controller.output().changes.is_empty());
    }

    #[test]
    fn blink_interval_follows_phase() {
        let mut controller = controller();
        run_until(&mut controller, Phase::PedestrianBlinkWarning);
        assert_eq!(controller.tick_interval_ms(), 500);
        run_until(&mut controller, Phase::VehicleRedYellow);
        assert_eq!(controller.tick_interval_ms(), 1000);
    }

    #[test]
    fn second_red_is_shorter() {
        let mut controller = controller();
        run_until(&mut controller, Phase::VehicleYellow);
        assert!(controller.is_first_cycle());
        run_until(&mut controller, Phase::VehicleRed);
        assert_eq!(controller.cycle(), 1);
        assert_eq!(controller.remaining_ms(), 8000);
    }

    #[test]
    fn wait_outside_green_is_ignored() {
        let controller = controller();
        assert_eq!(
            controller.request_wait(CommandSource::WebApi),
            CommandOutcome::Ignored(RejectReason::NotVehicleGreen)
        );
        assert!(!controller.state().wait_pending);
    }

    #[test]
    fn wait_handle_outside_green_is_discarded() {
        let mut controller = controller();
        controller.wait_handle().request();
        controller.tick().unwrap();
        assert!(!controller.state().wait_pending);
        assert_eq!(controller.remaining_ms(), 2000);
    }

    #[test]
    fn wait_consumes_the_tick() {
        let mut controller = controller();
        run_until(&mut controller, Phase::VehicleGreen);
        controller.request_wait(CommandSource::Mqtt);
        assert!(controller.state().wait_pending);

        controller.tick().unwrap();
        assert_eq!(controller.remaining_ms(), 2000);
        assert!(!controller.state().wait_pending);

        let last = controller.output().changes.last().copied().unwrap();
        assert_eq!(last.indicator, Indicator::CrossingButton);
        assert_eq!(last.value, IndicatorValue::Color(ButtonColor::Acknowledged));
    }

    #[test]
    fn resync_pushes_everything() {
        let mut controller = controller();
        controller.resync().unwrap();
        assert_eq!(controller.output().changes.len(), Indicator::ALL.len());
    }

    #[test]
    fn output_failure_is_retried() {
        let mut controller = controller();
        controller.tick().unwrap();
        controller.tick().unwrap();

        controller.output_mut().fail = true;
        assert!(controller.tick().is_err());
        assert_eq!(controller.phase(), Phase::VehicleRed);

        // The unpublished lamps go out with the next successful tick
        controller.output_mut().fail = false;
        controller.tick().unwrap();
        assert_eq!(controller.output().current, controller.indicators());
    }

    #[test]
    fn progress_tracks_phase() {
        let mut controller = controller();
        run_until(&mut controller, Phase::VehicleGreen);
        for _ in 0..2 {
            controller.tick().unwrap();
        }
        let progress = controller.progress();
        assert_eq!(progress.phase, Phase::VehicleGreen);
        assert_eq!(progress.elapsed_ms, 2000);
        assert_eq!(progress.total_ms, 8000);
    }

    #[test]
    fn invalid_timing_rejected() {
        let timing = TimingConfig::default().with_intervals(0, 0);
        assert!(SignalController::with_timing(MockLamps::new(), timing).is_err());
    }

    #[test]
    fn state_default_matches_new_controller() {
        assert_eq!(controller().state(), SignalState::default());
    }
}
