//! Unit types for physical quantities.
//!
//! Provides type-safe representations of revolutions, rotational speed,
//! motor steps and durations to prevent unit confusion at compile time.

use core::ops::{Add, Mul, Neg, Sub};

use libm::fabsf;
use serde::Deserialize;

use crate::error::ConfigError;

/// Shaft angle in revolutions.
///
/// Used for the user-facing API. Internally converted to [`Steps`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Revolutions(pub f32);

impl Revolutions {
    /// Create a new Revolutions value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Convert to degrees.
    #[inline]
    pub fn to_degrees(self) -> f32 {
        self.0 * 360.0
    }
}

impl Add for Revolutions {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Revolutions {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Rotational speed in revolutions per second.
///
/// The sign encodes direction: positive is clockwise, zero and negative are
/// counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct RevolutionsPerSec(pub f32);

impl RevolutionsPerSec {
    /// Create a new RevolutionsPerSec value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Speed magnitude, direction dropped.
    #[inline]
    pub fn magnitude(self) -> f32 {
        fabsf(self.0)
    }
}

impl Mul<f32> for RevolutionsPerSec {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Neg for RevolutionsPerSec {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

/// A duration in whole microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct Microseconds(pub u32);

impl Microseconds {
    /// Create a new Microseconds value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

#[cfg(feature = "std")]
impl From<Microseconds> for std::time::Duration {
    fn from(us: Microseconds) -> Self {
        std::time::Duration::from_micros(us.0 as u64)
    }
}

/// Motor position in steps (absolute from origin).
///
/// Uses i64 for unlimited range in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Steps(pub i64);

impl Steps {
    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Convert to revolutions using the steps per revolution ratio.
    #[inline]
    pub fn to_revolutions(self, steps_per_revolution: f32) -> Revolutions {
        Revolutions(self.0 as f32 / steps_per_revolution)
    }

    /// Create from revolutions: add half a step, then truncate toward zero.
    ///
    /// Positive values round half up. Negative values end up to one step
    /// closer to zero than the exact product, e.g. -1.5 steps becomes -1 and
    /// -1.0 becomes 0.
    #[inline]
    pub fn from_revolutions(revolutions: Revolutions, steps_per_revolution: f32) -> Self {
        Self((revolutions.0 * steps_per_revolution + 0.5) as i64)
    }
}

impl Add for Steps {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Steps {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

/// Microstep divisor (1, 2, 4, 8, 16, 32, 64, 128, 256).
///
/// Validated at construction to be a power of 2 within the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Microsteps(u16);

impl Microsteps {
    /// Full step (no microstepping).
    pub const FULL: Self = Self(1);
    /// Half step.
    pub const HALF: Self = Self(2);
    /// Quarter step.
    pub const QUARTER: Self = Self(4);
    /// Eighth step.
    pub const EIGHTH: Self = Self(8);
    /// Sixteenth step.
    pub const SIXTEENTH: Self = Self(16);
    /// Thirty-second step.
    pub const THIRTY_SECOND: Self = Self(32);

    /// Valid microstep values.
    const VALID_VALUES: [u16; 9] = [1, 2, 4, 8, 16, 32, 64, 128, 256];

    /// Create a new Microsteps value with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMicrosteps` if the value is not a valid power of 2.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        if Self::VALID_VALUES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidMicrosteps(value))
        }
    }

    /// Get the raw divisor value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl Default for Microsteps {
    fn default() -> Self {
        Self::FULL
    }
}

impl TryFrom<u16> for Microsteps {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Microsteps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u16::deserialize(deserializer)?;
        Microsteps::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Revolutions.
    fn revolutions(self) -> Revolutions;
    /// Convert to RevolutionsPerSec.
    fn rev_per_sec(self) -> RevolutionsPerSec;
}

impl UnitExt for f32 {
    #[inline]
    fn revolutions(self) -> Revolutions {
        Revolutions(self)
    }

    #[inline]
    fn rev_per_sec(self) -> RevolutionsPerSec {
        RevolutionsPerSec(self)
    }
}
