//! One-shot pulse timer on a Tokio runtime.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use embedded_hal::digital::OutputPin;
use tokio::task::JoinHandle;

use crate::config::units::Microseconds;
use crate::error::{MotorError, Result};
use crate::motor::StepPulse;

/// Granularity of Tokio timers.
pub const TIMER_RESOLUTION: Microseconds = Microseconds(1_000);

/// STEP line pulse generator backed by a Tokio sleep.
///
/// `emit` asserts the line, then spawns a one-shot task that deasserts it
/// after the pulse width. The STEP pin is shared between the worker and that
/// task. Tokio timers have millisecond resolution, so the configured width is
/// a lower bound on the actual high time.
///
/// Both the deassert sleep and the next tick can round up by one timer step,
/// so ticks closer than the width plus two steps are refused (see
/// [`StepPulse::min_interval`]).
pub struct PulseTimer<STEP>
where
    STEP: OutputPin + Send + 'static,
{
    pin: Arc<Mutex<STEP>>,
    width: Microseconds,
    pending: Option<JoinHandle<()>>,
}

impl<STEP> PulseTimer<STEP>
where
    STEP: OutputPin + Send + 'static,
{
    /// Create a pulse timer; the STEP line is not touched until first use.
    pub fn new(step_pin: STEP, width: Microseconds) -> Self {
        Self {
            pin: Arc::new(Mutex::new(step_pin)),
            width,
            pending: None,
        }
    }

    /// Whether a deassert is still scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }
}

fn write_level<STEP: OutputPin>(pin: &Mutex<STEP>, high: bool) -> Result<()> {
    let mut pin = pin.lock().map_err(|_| MotorError::PinError)?;
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| MotorError::PinError)?;
    Ok(())
}

impl<STEP> StepPulse for PulseTimer<STEP>
where
    STEP: OutputPin + Send + 'static,
{
    fn width(&self) -> Microseconds {
        self.width
    }

    fn min_interval(&self) -> Microseconds {
        Microseconds(self.width.0.saturating_add(2 * TIMER_RESOLUTION.0))
    }

    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    fn emit(&mut self) -> Result<()> {
        // A late deassert still pending: drop the line first so this pulse
        // keeps its own rising edge.
        if let Some(previous) = self.pending.take() {
            if !previous.is_finished() {
                previous.abort();
                write_level(&self.pin, false)?;
            }
        }

        write_level(&self.pin, true)?;

        let pin = Arc::clone(&self.pin);
        let width = Duration::from(self.width);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(width).await;
            if let Err(e) = write_level(&pin, false) {
                tracing::warn!(error = %e, "step line deassert failed");
            }
        }));
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        write_level(&self.pin, false)
    }

    fn cancel(&mut self) -> Result<()> {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        write_level(&self.pin, false)
    }
}

impl<STEP> Drop for PulseTimer<STEP>
where
    STEP: OutputPin + Send + 'static,
{
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
