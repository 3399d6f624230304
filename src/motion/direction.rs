//! Rotation direction and its mapping to the DIR line.

use crate::config::units::{RevolutionsPerSec, Steps};

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise (positive step count).
    Clockwise,
    /// Counter-clockwise (negative step count).
    CounterClockwise,
}

impl Direction {
    /// Get direction from a commanded speed.
    ///
    /// Zero counts as counter-clockwise.
    #[inline]
    pub fn from_speed(speed: RevolutionsPerSec) -> Self {
        if speed.0 > 0.0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }

    /// Get direction from signed step count.
    #[inline]
    pub fn from_steps(steps: Steps) -> Self {
        if steps.0 >= 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    /// DIR line level for this direction (high = CW unless inverted).
    #[inline]
    pub fn pin_level(self, inverted: bool) -> bool {
        (self == Direction::Clockwise) != inverted
    }

    /// Direction encoded by a DIR line level.
    #[inline]
    pub fn from_pin_level(high: bool, inverted: bool) -> Self {
        if high != inverted {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }
}
