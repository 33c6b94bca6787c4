//! Indicator output that writes to the log.
//!
//! Used by the desktop binary in place of real lamps.

use core::convert::Infallible;

use crate::indicator::{IndicatorChange, Indicators};
use crate::traits::IndicatorOutput;

/// Logs every indicator change at `info` level.
///
/// # Example
///
/// ```rust
/// use rs_crossing::hal::LogLamps;
/// use rs_crossing::{SignalController, Phase};
///
/// let mut controller = SignalController::new(LogLamps::new());
/// for _ in 0..3 {
///     controller.tick().unwrap();
/// }
/// assert_eq!(controller.output().current(), controller.indicators());
/// ```
#[derive(Debug, Default)]
pub struct LogLamps {
    current: Indicators,
}

impl LogLamps {
    /// Creates a logger with all lamps dark.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn current(&self) -> Indicators {
        self.current
    }
}

impl IndicatorOutput for LogLamps {
    type Error = Infallible;

    fn apply(&mut self, change: IndicatorChange) -> Result<(), Infallible> {
        self.current.set(change);
        tracing::info!(
            indicator = change.indicator.as_str(),
            value = change.value.as_str(),
            "indicator changed"
        );
        Ok(())
    }
}
