//! Builder pattern for StepperDriver.

use embedded_hal::digital::StatefulOutputPin;

use crate::config::units::{Microsteps, RevolutionsPerSec};
use crate::config::{MotorConfig, SystemConfig, TimingConstraints, DEFAULT_INITIAL_SPEED};
use crate::error::{ConfigError, Error, Result};

use super::driver::StepperDriver;
use super::pulse::StepPulse;

/// Builder for creating StepperDriver instances.
pub struct StepperBuilder<PULSE, DIR>
where
    PULSE: StepPulse,
    DIR: StatefulOutputPin,
{
    pulse: Option<PULSE>,
    dir_pin: Option<DIR>,
    name: Option<heapless::String<32>>,
    steps_per_revolution: Option<f32>,
    microsteps: Option<Microsteps>,
    initial_speed: RevolutionsPerSec,
    invert_direction: bool,
}

impl<PULSE, DIR> Default for StepperBuilder<PULSE, DIR>
where
    PULSE: StepPulse,
    DIR: StatefulOutputPin,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<PULSE, DIR> StepperBuilder<PULSE, DIR>
where
    PULSE: StepPulse,
    DIR: StatefulOutputPin,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            pulse: None,
            dir_pin: None,
            name: None,
            steps_per_revolution: None,
            microsteps: None,
            initial_speed: DEFAULT_INITIAL_SPEED,
            invert_direction: false,
        }
    }

    /// Set the STEP pulse generator.
    ///
    /// Its width is the pulse width used for speed validation.
    pub fn pulse(mut self, pulse: PULSE) -> Self {
        self.pulse = Some(pulse);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the motor name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = heapless::String::try_from(name).ok();
        self
    }

    /// Set steps per revolution (base motor steps before microstepping).
    pub fn steps_per_revolution(mut self, steps: f32) -> Self {
        self.steps_per_revolution = Some(steps);
        self
    }

    /// Set microstep configuration.
    pub fn microsteps(mut self, microsteps: Microsteps) -> Self {
        self.microsteps = Some(microsteps);
        self
    }

    /// Set the speed applied at construction.
    pub fn initial_speed(mut self, speed: RevolutionsPerSec) -> Self {
        self.initial_speed = speed;
        self
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Configure from a MotorConfig.
    ///
    /// The pulse width comes from the pulse generator, so build it with
    /// `config.pulse_width`.
    pub fn from_motor_config(mut self, config: &MotorConfig) -> Self {
        self.name = Some(config.name.clone());
        self.steps_per_revolution = Some(config.steps_per_revolution);
        self.microsteps = Some(config.microsteps);
        self.initial_speed = config.initial_speed;
        self.invert_direction = config.invert_direction;
        self
    }

    /// Configure from SystemConfig by motor name.
    pub fn from_config(self, config: &SystemConfig, motor_name: &str) -> Result<Self> {
        let motor_config = config
            .motor(motor_name)
            .ok_or_else(|| Error::Config(ConfigError::MotorNotFound(
                heapless::String::try_from(motor_name).unwrap_or_default(),
            )))?;

        Ok(self.from_motor_config(motor_config))
    }

    /// Build the StepperDriver.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing, steps per revolution
    /// is not positive, or the initial speed is unusable.
    pub fn build(self) -> Result<StepperDriver<PULSE, DIR>> {
        let pulse = self.pulse.ok_or_else(|| missing("pulse is required"))?;
        let dir_pin = self.dir_pin.ok_or_else(|| missing("dir_pin is required"))?;
        let steps = self
            .steps_per_revolution
            .ok_or_else(|| missing("steps_per_revolution is required"))?;

        let name = self
            .name
            .unwrap_or_else(|| heapless::String::try_from("motor").unwrap_or_default());

        let microsteps = self.microsteps.unwrap_or(Microsteps::FULL);
        let timing = TimingConstraints::new(
            steps * microsteps.value() as f32,
            pulse.width(),
            self.invert_direction,
        );

        StepperDriver::new(pulse, dir_pin, timing, self.initial_speed, name)
    }
}

fn missing(what: &str) -> Error {
    Error::Config(ConfigError::ParseError(
        heapless::String::try_from(what).unwrap_or_default(),
    ))
}
