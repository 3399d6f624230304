//! Position tracking for stepper motors.
//!
//! Provides absolute position tracking in steps with unit conversions.

use crate::config::units::{Revolutions, Steps};

/// Motor position tracker.
///
/// Maintains absolute position in steps and provides unit conversions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Position {
    /// Current position in steps (from origin)
    steps: Steps,
    /// Steps per revolution for conversions
    steps_per_revolution: f32,
}

impl Position {
    /// Create a new position tracker.
    #[inline]
    pub fn new(steps_per_revolution: f32) -> Self {
        Self {
            steps: Steps::default(),
            steps_per_revolution,
        }
    }

    /// Create a position tracker at a specific position.
    #[inline]
    pub fn at(steps: Steps, steps_per_revolution: f32) -> Self {
        Self {
            steps,
            steps_per_revolution,
        }
    }

    /// Get current position in steps.
    #[inline]
    pub fn steps(&self) -> Steps {
        self.steps
    }

    /// Get current position in revolutions.
    #[inline]
    pub fn revolutions(&self) -> Revolutions {
        self.steps.to_revolutions(self.steps_per_revolution)
    }

    /// Set position in revolutions, rounded half up to a whole step.
    #[inline]
    pub fn set_revolutions(&mut self, revolutions: Revolutions) {
        self.steps = Steps::from_revolutions(revolutions, self.steps_per_revolution);
    }

    /// Move by a number of steps.
    #[inline]
    pub fn move_steps(&mut self, delta: i64) {
        self.steps = self.steps + Steps(delta);
    }

    /// Set current position as the new origin.
    #[inline]
    pub fn set_origin(&mut self) {
        self.steps = Steps::default();
    }

    /// Calculate steps needed to reach a target step count.
    #[inline]
    pub fn steps_to(&self, target: Steps) -> i64 {
        (target - self.steps).0
    }
}
