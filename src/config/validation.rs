//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::motion::TickInterval;

use super::{MotorConfig, SystemConfig, TimingConstraints};

/// Validate a system configuration.
///
/// Checks every motor:
/// - Steps per revolution is finite and positive
/// - Pulse width is non-zero
/// - Initial speed yields a tick interval longer than the pulse
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (_, motor) in config.motors.iter() {
        validate_motor(motor)?;
    }

    Ok(())
}

/// Validate a single motor configuration.
pub fn validate_motor(config: &MotorConfig) -> Result<()> {
    let steps = config.total_steps_per_revolution();
    if !steps.is_finite() || steps <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(
            config.steps_per_revolution,
        )));
    }

    if config.pulse_width.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidPulseWidth(config.pulse_width.0)));
    }

    let timing = TimingConstraints::from_config(config);
    if TickInterval::from_speed(config.initial_speed, &timing).is_err() {
        return Err(Error::Config(ConfigError::InvalidInitialSpeed(
            config.initial_speed.0,
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Microseconds, RevolutionsPerSec};

    #[test]
    fn test_invalid_steps_per_revolution() {
        for steps in [0.0, -200.0, f32::NAN] {
            let config = MotorConfig::new("test", steps);
            let result = validate_motor(&config);
            assert!(matches!(
                result,
                Err(Error::Config(ConfigError::InvalidStepsPerRevolution(_)))
            ));
        }
    }

    #[test]
    fn test_zero_pulse_width() {
        let config = MotorConfig {
            pulse_width: Microseconds(0),
            ..MotorConfig::new("test", 200.0)
        };
        assert!(matches!(
            validate_motor(&config),
            Err(Error::Config(ConfigError::InvalidPulseWidth(0)))
        ));
    }

    #[test]
    fn test_zero_initial_speed() {
        let config = MotorConfig {
            initial_speed: RevolutionsPerSec(0.0),
            ..MotorConfig::new("test", 200.0)
        };
        assert!(matches!(
            validate_motor(&config),
            Err(Error::Config(ConfigError::InvalidInitialSpeed(_)))
        ));
    }

    #[test]
    fn test_valid_motor() {
        assert!(validate_motor(&MotorConfig::new("test", 200.0)).is_ok());
    }
}
