//! Timing constraints derived from motor configuration.

use super::motor::MotorConfig;
use super::units::{Microseconds, RevolutionsPerSec};

/// Derived timing parameters computed from motor configuration.
///
/// These are computed once at initialization and used for every speed change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConstraints {
    /// Total steps per output revolution (steps × microsteps).
    pub steps_per_revolution: f32,

    /// Tick interval in microseconds at 1 rev/s.
    pub us_per_step_at_unit_speed: f32,

    /// Step pulse width.
    pub pulse_width: Microseconds,

    /// Shortest tick interval accepted; always longer than the pulse.
    pub min_interval: Microseconds,

    /// Direction pin logic inverted.
    pub invert_direction: bool,
}

impl TimingConstraints {
    /// Compute timing constraints from motor configuration.
    pub fn from_config(config: &MotorConfig) -> Self {
        Self::new(
            config.total_steps_per_revolution(),
            config.pulse_width,
            config.invert_direction,
        )
    }

    /// Compute timing constraints from raw values.
    pub fn new(steps_per_revolution: f32, pulse_width: Microseconds, invert_direction: bool) -> Self {
        Self {
            steps_per_revolution,
            us_per_step_at_unit_speed: 1_000_000.0 / steps_per_revolution,
            pulse_width,
            min_interval: Microseconds(pulse_width.0.saturating_add(1)),
            invert_direction,
        }
    }

    /// Raise the shortest accepted interval, e.g. for a coarse pulse timer.
    ///
    /// Never goes below one microsecond past the pulse width.
    pub fn with_min_interval(self, min_interval: Microseconds) -> Self {
        Self {
            min_interval: min_interval.max(Microseconds(self.pulse_width.0.saturating_add(1))),
            ..self
        }
    }

    /// Largest speed magnitude whose interval is still accepted.
    ///
    /// Intervals are rounded to whole microseconds, so anything rounding to
    /// `min_interval` or more is accepted.
    pub fn max_speed(&self) -> RevolutionsPerSec {
        RevolutionsPerSec(self.us_per_step_at_unit_speed / (self.min_interval.0 as f32 - 0.5))
    }
}
