//! Unified shared state for all signal controller services.
//!
//! `SharedSignalState` provides thread-safe access to a single
//! `SignalController` that is shared between the ticker, web, MQTT, and
//! physical input services.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rs_crossing::services::SharedSignalState;
//!
//! let state = Arc::new(SharedSignalState::new(controller));
//!
//! // Web service uses state.state() for reads
//! let snapshot = state.state();
//!
//! // Wait requests go through the shared controller
//! state.request_wait(CommandSource::WebApi);
//!
//! // Change detection for MQTT publishing
//! if let Some(changes) = state.check_changes() {
//!     // Publish changes.indicators to MQTT
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::controller::{SignalController, SignalState};
use crate::indicator::{IndicatorChanges, Indicators};
use crate::phase::Phase;
use crate::traits::IndicatorOutput;
use crate::{CommandOutcome, CommandSource};

// ============================================================================
// State Provider Trait
// ============================================================================

/// Trait for providing signal state access.
///
/// Lets the HTTP handlers and the MQTT bridge work against anything that can
/// hand out a snapshot and take a wait request.
pub trait StateProvider: Send + Sync {
    /// Get the current signal state.
    fn state(&self) -> SignalState;

    /// Milliseconds since the services started.
    fn now_ms(&self) -> u64;

    /// Forward a wait request to the controller.
    fn request_wait(&self, source: CommandSource) -> CommandOutcome;
}

// ============================================================================
// Change Detection
// ============================================================================

/// Tracks last known state for change detection (used by MQTT publishing)
#[derive(Clone, Debug, Default)]
pub struct ChangeDetection {
    /// Last published phase
    pub last_phase: Phase,
    /// Last published indicator snapshot
    pub last_indicators: Indicators,
}

/// What changed since the previous [`SharedSignalState::check_changes`].
#[derive(Clone, Debug)]
pub struct ChangeSet {
    /// The new phase, if it changed.
    pub phase: Option<Phase>,
    /// Indicators that changed, in publication order.
    pub indicators: IndicatorChanges,
    /// Full state at the time of the check.
    pub state: SignalState,
}

// ============================================================================
// Shared Signal State
// ============================================================================

/// Unified shared state for all services (ticker, web, MQTT, physical).
///
/// # Thread Safety
///
/// - Uses `Mutex` for controller access; the ticker writes on every tick.
/// - Change detection has a separate lock to minimize contention during MQTT publishes.
/// - A poisoned lock is recovered rather than propagated, so one panicking
///   handler cannot stop the lights.
pub struct SharedSignalState<O: IndicatorOutput> {
    /// The signal controller - needs mutable access for ticks
    controller: Mutex<SignalController<O>>,

    /// Time when the state was created (for consistent timestamps across services)
    start_time: Instant,

    /// Change detection for MQTT publishing (separate lock for less contention)
    change_detection: Mutex<ChangeDetection>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<O: IndicatorOutput> SharedSignalState<O> {
    /// Create new shared state wrapping a controller.
    ///
    /// Change detection starts from the controller's current snapshot.
    pub fn new(controller: SignalController<O>) -> Self {
        let detection = ChangeDetection {
            last_phase: controller.phase(),
            last_indicators: controller.indicators(),
        };
        Self {
            controller: Mutex::new(controller),
            start_time: Instant::now(),
            change_detection: Mutex::new(detection),
        }
    }

    /// Get current timestamp in milliseconds since state creation.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Get the start time instant (for external time calculations if needed).
    #[inline]
    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Access the controller with a mutable lock.
    ///
    /// The closure pattern prevents accidentally holding the lock across await points.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let result = state.with_controller(|controller| controller.tick());
    /// ```
    pub fn with_controller<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut SignalController<O>) -> R,
    {
        let mut guard = lock(&self.controller);
        f(&mut guard)
    }

    /// Get a read-only state snapshot.
    pub fn state(&self) -> SignalState {
        lock(&self.controller).state()
    }

    /// Forward a wait request to the controller.
    pub fn request_wait(&self, source: CommandSource) -> CommandOutcome {
        lock(&self.controller).request_wait(source)
    }

    /// Tick the controller once, returning the interval until the next tick.
    pub fn tick(&self) -> Result<u32, O::Error> {
        let mut controller = lock(&self.controller);
        controller.tick()?;
        Ok(controller.tick_interval_ms())
    }

    /// Check for state changes since last check and update detection state.
    ///
    /// Returns `Some(ChangeSet)` if the phase or any indicator changed since
    /// the last call, `None` if unchanged.
    pub fn check_changes(&self) -> Option<ChangeSet> {
        // Get current state (brief lock)
        let state = self.state();

        // Check for changes (separate lock)
        let mut detection = lock(&self.change_detection);
        let indicators = detection.last_indicators.diff(&state.indicators);
        let phase = (state.phase != detection.last_phase).then_some(state.phase);

        if phase.is_none() && indicators.is_empty() {
            return None;
        }

        detection.last_phase = state.phase;
        detection.last_indicators = state.indicators;
        Some(ChangeSet {
            phase,
            indicators,
            state,
        })
    }

    /// Force synchronization of change detection state.
    ///
    /// Updates the change detection baseline without triggering a "change" event.
    pub fn sync_change_detection(&self) {
        let state = self.state();
        let mut detection = lock(&self.change_detection);
        detection.last_phase = state.phase;
        detection.last_indicators = state.indicators;
    }

    /// Get current change detection values (for debugging/testing).
    pub fn change_detection_state(&self) -> ChangeDetection {
        lock(&self.change_detection).clone()
    }
}

// ============================================================================
// StateProvider Implementation for Arc<SharedSignalState>
// ============================================================================

impl<O: IndicatorOutput + Send + 'static> StateProvider for Arc<SharedSignalState<O>> {
    fn state(&self) -> SignalState {
        SharedSignalState::state(self)
    }

    fn now_ms(&self) -> u64 {
        SharedSignalState::now_ms(self)
    }

    fn request_wait(&self, source: CommandSource) -> CommandOutcome {
        SharedSignalState::request_wait(self, source)
    }
}
