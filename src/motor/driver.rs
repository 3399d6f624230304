//! Stepper motor driver.
//!
//! Binds the [`MotionStateMachine`] to a DIR line and a [`StepPulse`] output.
//! The owner calls [`StepperDriver::dispatch`] once per tick, from a timer
//! interrupt on bare metal or from the worker task of [`crate::runtime`].

use embedded_hal::digital::StatefulOutputPin;

use crate::config::units::{Revolutions, RevolutionsPerSec, Steps};
use crate::config::TimingConstraints;
use crate::error::{MotorError, Result};
use crate::motion::{Direction, MotionStateMachine, MotorMode, TickAction, TickInterval};

use super::pulse::StepPulse;

/// Stepper motor driver.
///
/// Generic over:
/// - `PULSE`: STEP line pulse generator (must implement `StepPulse`)
/// - `DIR`: DIR pin type (must implement `StatefulOutputPin` so it can be read back)
pub struct StepperDriver<PULSE, DIR>
where
    PULSE: StepPulse,
    DIR: StatefulOutputPin,
{
    /// STEP line pulse generator.
    pulse: PULSE,

    /// DIR pin (high = CW, low = CCW, or inverted).
    dir_pin: DIR,

    /// Mode, position and speed.
    machine: MotionStateMachine,

    /// Motor name for logging/debugging.
    name: heapless::String<32>,
}

impl<PULSE, DIR> StepperDriver<PULSE, DIR>
where
    PULSE: StepPulse,
    DIR: StatefulOutputPin,
{
    /// Create an idle driver and drive the DIR line for the initial speed.
    ///
    /// # Errors
    ///
    /// Fails on invalid timing, an unusable initial speed, or a pin error.
    pub(crate) fn new(
        pulse: PULSE,
        dir_pin: DIR,
        timing: TimingConstraints,
        initial_speed: RevolutionsPerSec,
        name: heapless::String<32>,
    ) -> Result<Self> {
        let timing = TimingConstraints {
            pulse_width: pulse.width(),
            ..timing
        }
        .with_min_interval(pulse.min_interval());
        let machine = MotionStateMachine::new(timing, initial_speed)?;

        let mut driver = Self {
            pulse,
            dir_pin,
            machine,
            name,
        };
        driver.write_direction(Direction::from_speed(initial_speed))?;
        driver.pulse.release()?;
        Ok(driver)
    }

    /// Get the motor name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Get current position in steps.
    #[inline]
    pub fn position(&self) -> Steps {
        self.machine.position()
    }

    /// Get current position in revolutions.
    #[inline]
    pub fn rotations(&self) -> Revolutions {
        self.machine.rotations()
    }

    /// Get the commanded speed.
    #[inline]
    pub fn speed(&self) -> RevolutionsPerSec {
        self.machine.speed()
    }

    /// Get the current position target.
    #[inline]
    pub fn setpoint(&self) -> Steps {
        self.machine.setpoint()
    }

    /// Get the current mode.
    #[inline]
    pub fn mode(&self) -> MotorMode {
        self.machine.mode()
    }

    /// Get the tick interval for the commanded speed.
    #[inline]
    pub fn tick_interval(&self) -> TickInterval {
        self.machine.interval()
    }

    /// Get the timing constraints.
    #[inline]
    pub fn timing(&self) -> &TimingConstraints {
        self.machine.timing()
    }

    /// Read the direction currently on the DIR line.
    pub fn direction(&mut self) -> Result<Direction> {
        let high = self.dir_pin.is_set_high().map_err(|_| MotorError::PinError)?;
        Ok(Direction::from_pin_level(high, self.machine.timing().invert_direction))
    }

    /// Write the DIR line directly.
    ///
    /// Bypasses mode logic: `true` is the level for clockwise. The caller must
    /// keep it consistent with the active command.
    pub fn set_direction(&mut self, clockwise: bool) -> Result<()> {
        let direction = if clockwise {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        };
        self.write_direction(direction)
    }

    /// Change the commanded speed.
    ///
    /// Any motion in progress ends: the machine enters `Stopping` and stays
    /// there until [`rearmed`](Self::rearmed) is called or the next tick is
    /// dispatched. Returns the interval the tick source must be rearmed with.
    ///
    /// # Errors
    ///
    /// Rejects zero, non-finite and too-fast speeds, and fails if the DIR
    /// line cannot be written. State is unchanged on error.
    pub fn set_speed(&mut self, speed: RevolutionsPerSec) -> Result<TickInterval> {
        let (direction, interval) = self.machine.plan_speed(speed)?;
        self.write_direction(direction)?;
        self.machine.apply_speed(speed, interval);
        Ok(interval)
    }

    /// Acknowledge that the tick source runs at the new interval.
    pub fn rearmed(&mut self) {
        self.machine.finish_reconfigure();
    }

    /// Make the current position the origin.
    pub fn set_absolute_zero_position(&mut self) {
        self.machine.set_zero();
    }

    /// Redefine the current position in revolutions without moving.
    pub fn set_position_revolutions(&mut self, revolutions: Revolutions) -> Result<()> {
        self.machine.set_position_revolutions(revolutions)?;
        Ok(())
    }

    /// Move to an absolute step count.
    ///
    /// The DIR line is written first; if that fails the target is not taken.
    pub fn set_absolute_position(&mut self, target: Steps) -> Result<()> {
        self.write_direction(self.machine.direction_to(target))?;
        self.machine.target_absolute(target);
        Ok(())
    }

    /// Move by a number of steps.
    pub fn set_relative_position(&mut self, delta: Steps) -> Result<()> {
        self.set_absolute_position(self.position() + delta)
    }

    /// Move to an absolute position in revolutions.
    pub fn set_absolute_revolutions(&mut self, revolutions: Revolutions) -> Result<()> {
        let target = self.machine.steps_for(revolutions)?;
        self.set_absolute_position(target)
    }

    /// Move by an amount in revolutions.
    pub fn set_relative_revolutions(&mut self, revolutions: Revolutions) -> Result<()> {
        let delta = self.machine.steps_for(revolutions)?;
        self.set_relative_position(delta)
    }

    /// Rotate continuously at the commanded speed.
    pub fn start_rotation(&mut self) {
        self.machine.start_rotation();
    }

    /// Stop continuous rotation after the next pulse.
    pub fn stop_rotation(&mut self) {
        self.machine.stop_rotation();
    }

    /// Execute one tick.
    ///
    /// Returns `true` if a step pulse was emitted. The DIR line is read
    /// before the pulse goes out, so a failed read emits nothing and the
    /// step count stays in line with the shaft.
    pub fn dispatch(&mut self) -> Result<bool> {
        match self.machine.next_action() {
            TickAction::Hold => {
                self.pulse.release()?;
                Ok(false)
            }
            TickAction::Step => {
                let direction = self.direction()?;
                self.pulse.emit()?;
                self.machine.record_pulse(direction);
                Ok(true)
            }
        }
    }

    /// Cancel any pending pulse and leave the STEP line low.
    pub fn halt(&mut self) -> Result<()> {
        self.pulse.cancel()
    }

    /// Release the pulse generator and DIR pin.
    pub fn into_parts(self) -> (PULSE, DIR) {
        (self.pulse, self.dir_pin)
    }

    fn write_direction(&mut self, direction: Direction) -> Result<()> {
        let result = if direction.pin_level(self.machine.timing().invert_direction) {
            self.dir_pin.set_high()
        } else {
            self.dir_pin.set_low()
        };
        result.map_err(|_| MotorError::PinError)?;
        Ok(())
    }
}
