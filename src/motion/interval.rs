//! Tick interval math.
//!
//! Turns a commanded speed into the period of the tick source:
//! `interval = round((1e6 / steps_per_revolution) / |speed|)` microseconds.

use libm::roundf;

use crate::config::units::{Microseconds, RevolutionsPerSec};
use crate::config::TimingConstraints;
use crate::error::CommandError;

/// Period between two ticks, never shorter than the timing's minimum interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickInterval(u32);

impl TickInterval {
    /// Compute the interval for a commanded speed.
    ///
    /// # Errors
    ///
    /// - `ZeroSpeed` for a speed of exactly zero
    /// - `NonFiniteSpeed` for NaN or infinity
    /// - `SpeedTooHigh` when the rounded interval is below `min_interval`,
    ///   which is at least one microsecond longer than the pulse
    pub fn from_speed(
        speed: RevolutionsPerSec,
        timing: &TimingConstraints,
    ) -> Result<Self, CommandError> {
        if !speed.0.is_finite() {
            return Err(CommandError::NonFiniteSpeed(speed.0));
        }
        if speed.0 == 0.0 {
            return Err(CommandError::ZeroSpeed);
        }

        // f32 -> u32 saturates, so very slow speeds clamp to u32::MAX us
        let us = roundf(timing.us_per_step_at_unit_speed / speed.magnitude()) as u32;
        if us < timing.min_interval.0 {
            return Err(CommandError::SpeedTooHigh {
                requested: speed.magnitude(),
                max: timing.max_speed().0,
            });
        }

        Ok(Self(us))
    }

    /// Interval in microseconds.
    #[inline]
    pub const fn micros(self) -> Microseconds {
        Microseconds(self.0)
    }

    /// Ticks per second at this interval.
    #[inline]
    pub fn frequency_hz(self) -> f32 {
        1_000_000.0 / self.0 as f32
    }
}

impl From<TickInterval> for Microseconds {
    fn from(interval: TickInterval) -> Self {
        interval.micros()
    }
}

#[cfg(feature = "std")]
impl From<TickInterval> for std::time::Duration {
    fn from(interval: TickInterval) -> Self {
        interval.micros().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> TimingConstraints {
        TimingConstraints::new(200.0, Microseconds(10), false)
    }

    #[test]
    fn test_unit_speed() {
        let interval = TickInterval::from_speed(RevolutionsPerSec(1.0), &timing()).unwrap();
        assert_eq!(interval.micros(), Microseconds(5000));
        assert!((interval.frequency_hz() - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_negative_speed_uses_magnitude() {
        let interval = TickInterval::from_speed(RevolutionsPerSec(-2.0), &timing()).unwrap();
        assert_eq!(interval.micros(), Microseconds(2500));
    }

    #[test]
    fn test_rounds_to_nearest() {
        // 5000 / 3 = 1666.67
        let interval = TickInterval::from_speed(RevolutionsPerSec(3.0), &timing()).unwrap();
        assert_eq!(interval.micros(), Microseconds(1667));
    }

    #[test]
    fn test_rejects_zero_and_non_finite() {
        assert_eq!(
            TickInterval::from_speed(RevolutionsPerSec(0.0), &timing()),
            Err(CommandError::ZeroSpeed)
        );
        assert!(matches!(
            TickInterval::from_speed(RevolutionsPerSec(f32::NAN), &timing()),
            Err(CommandError::NonFiniteSpeed(_))
        ));
        assert!(matches!(
            TickInterval::from_speed(RevolutionsPerSec(f32::INFINITY), &timing()),
            Err(CommandError::NonFiniteSpeed(_))
        ));
    }

    #[test]
    fn test_rejects_interval_not_longer_than_pulse() {
        // 5000 / 500 = 10 us, equal to the pulse width
        assert!(matches!(
            TickInterval::from_speed(RevolutionsPerSec(500.0), &timing()),
            Err(CommandError::SpeedTooHigh { .. })
        ));
        // 5000 / 450 = 11.1 us
        let interval = TickInterval::from_speed(RevolutionsPerSec(450.0), &timing()).unwrap();
        assert_eq!(interval.micros(), Microseconds(11));
    }

    #[test]
    fn test_respects_raised_minimum() {
        let timing = timing().with_min_interval(Microseconds(2010));
        // 5000 / 2 = 2500 us
        assert!(TickInterval::from_speed(RevolutionsPerSec(2.0), &timing).is_ok());
        // 5000 / 3 = 1667 us, fine for the pulse but under the minimum
        assert!(matches!(
            TickInterval::from_speed(RevolutionsPerSec(-3.0), &timing),
            Err(CommandError::SpeedTooHigh { requested, .. }) if requested == 3.0
        ));
    }
}
