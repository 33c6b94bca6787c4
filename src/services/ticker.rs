//! Tokio tick loop for the shared controller.
//!
//! Deadlines are absolute: each tick is scheduled one interval after the
//! previous deadline, not after the previous tick finished, so lock waits
//! and scheduler latency do not stretch the cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

use crate::traits::IndicatorOutput;

use super::shared::SharedSignalState;

/// Push the full indicator state, then tick the shared controller forever.
///
/// Only returns if the output fails.
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(SharedSignalState::new(controller));
/// tokio::spawn(run_ticker(Arc::clone(&state)));
/// ```
pub async fn run_ticker<O: IndicatorOutput>(state: Arc<SharedSignalState<O>>) -> Result<(), O::Error> {
    let mut interval_ms = state.with_controller(|controller| -> Result<u32, O::Error> {
        controller.resync()?;
        Ok(controller.tick_interval_ms())
    })?;
    let mut deadline = Instant::now();

    loop {
        deadline += Duration::from_millis(u64::from(interval_ms));
        sleep_until(deadline).await;
        interval_ms = state.tick()?;
    }
}
