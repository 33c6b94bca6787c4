//! Async tick loop for targets without an OS timer.
//!
//! [`SignalDriver`] pairs a controller with a [`Delay`] and owns the loop
//! that feeds it ticks. Each step waits out the interval the controller
//! asks for, so an interval change on entering a blinking phase applies to
//! the very next delay.
//!
//! # Example
//!
//! ```rust
//! use rs_crossing::{SignalController, SignalDriver, Phase};
//! use rs_crossing::hal::{MockDelay, MockLamps};
//!
//! # tokio_test_block_on(async {
//! let controller = SignalController::new(MockLamps::new());
//! let mut driver = SignalDriver::new(controller, MockDelay::new());
//!
//! for _ in 0..3 {
//!     driver.step().await.unwrap();
//! }
//! assert_eq!(driver.controller().phase(), Phase::VehicleRed);
//! assert_eq!(driver.delay().delays, vec![1000, 1000, 1000]);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use core::convert::Infallible;

use crate::controller::SignalController;
use crate::traits::{Delay, IndicatorOutput};

/// Owns a controller and the delay that paces it.
pub struct SignalDriver<O: IndicatorOutput, D: Delay> {
    controller: SignalController<O>,
    delay: D,
}

impl<O: IndicatorOutput, D: Delay> SignalDriver<O, D> {
    /// Pair a controller with a delay source.
    pub fn new(controller: SignalController<O>, delay: D) -> Self {
        Self { controller, delay }
    }

    /// Wait one interval, then tick.
    pub async fn step(&mut self) -> Result<(), O::Error> {
        let interval_ms = self.controller.tick_interval_ms();
        self.delay.delay_ms(interval_ms).await;
        self.controller.tick()
    }

    /// Push the full indicator state, then tick forever.
    ///
    /// Only returns if the output fails.
    pub async fn run(&mut self) -> Result<Infallible, O::Error> {
        self.controller.resync()?;
        loop {
            self.step().await?;
        }
    }

    /// Borrow the controller
    pub fn controller(&self) -> &SignalController<O> {
        &self.controller
    }

    /// Mutably borrow the controller
    pub fn controller_mut(&mut self) -> &mut SignalController<O> {
        &mut self.controller
    }

    /// Borrow the delay source
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Split back into controller and delay
    pub fn into_parts(self) -> (SignalController<O>, D) {
        (self.controller, self.delay)
    }
}
