//! Step pulse generation.
//!
//! A [`StepPulse`] owns the STEP line. Each call to [`StepPulse::emit`]
//! asserts the line and guarantees it is deasserted again after the pulse
//! width, whatever the tick rate.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::Microseconds;
use crate::error::{MotorError, Result};

/// One-shot pulse output on the STEP line.
pub trait StepPulse {
    /// Minimum high time of a pulse.
    fn width(&self) -> Microseconds;

    /// Shortest tick interval at which consecutive pulses stay separate.
    ///
    /// Exact timers only need the line to drop before the next tick.
    fn min_interval(&self) -> Microseconds {
        Microseconds(self.width().0.saturating_add(1))
    }

    /// Assert the STEP line and arrange for it to be deasserted after [`width`].
    ///
    /// [`width`]: StepPulse::width
    fn emit(&mut self) -> Result<()>;

    /// Drive the STEP line low now.
    fn release(&mut self) -> Result<()>;

    /// Cancel any pending deassert and drive the STEP line low.
    fn cancel(&mut self) -> Result<()> {
        self.release()
    }
}

/// Pulse generator that busy-waits the pulse width with a `DelayNs`.
///
/// Suitable when dispatch runs from a timer interrupt and a few microseconds
/// of blocking is acceptable.
pub struct BlockingPulse<STEP, DELAY>
where
    STEP: OutputPin,
    DELAY: DelayNs,
{
    step_pin: STEP,
    delay: DELAY,
    width: Microseconds,
}

impl<STEP, DELAY> BlockingPulse<STEP, DELAY>
where
    STEP: OutputPin,
    DELAY: DelayNs,
{
    /// Create a pulse generator.
    pub fn new(step_pin: STEP, delay: DELAY, width: Microseconds) -> Self {
        Self {
            step_pin,
            delay,
            width,
        }
    }

    /// Release the STEP pin and delay provider.
    pub fn into_inner(self) -> (STEP, DELAY) {
        (self.step_pin, self.delay)
    }
}

impl<STEP, DELAY> StepPulse for BlockingPulse<STEP, DELAY>
where
    STEP: OutputPin,
    DELAY: DelayNs,
{
    fn width(&self) -> Microseconds {
        self.width
    }

    fn emit(&mut self) -> Result<()> {
        self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(self.width.0);
        self.step_pin.set_low().map_err(|_| MotorError::PinError)?;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.step_pin.set_low().map_err(|_| MotorError::PinError)?;
        Ok(())
    }
}
