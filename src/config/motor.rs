//! Motor configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::{Microseconds, Microsteps, RevolutionsPerSec};

/// Default step pulse width.
///
/// Driver variants in the field use 10 µs or 30 µs; both work with common
/// step/dir drivers as long as the tick interval stays longer.
pub const DEFAULT_PULSE_WIDTH: Microseconds = Microseconds(10);

/// Default speed applied at construction, in rev/s.
pub const DEFAULT_INITIAL_SPEED: RevolutionsPerSec = RevolutionsPerSec(1.0);

/// Complete motor configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Base steps per revolution (typically 200 for 1.8° motors).
    pub steps_per_revolution: f32,

    /// Microstep setting (1, 2, 4, 8, 16, 32, etc.).
    #[serde(default)]
    pub microsteps: Microsteps,

    /// Speed applied at construction; sign selects direction.
    #[serde(default = "default_initial_speed", rename = "initial_speed_rev_per_sec")]
    pub initial_speed: RevolutionsPerSec,

    /// Minimum high time of the step line.
    #[serde(default = "default_pulse_width", rename = "pulse_width_us")]
    pub pulse_width: Microseconds,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,
}

fn default_initial_speed() -> RevolutionsPerSec {
    DEFAULT_INITIAL_SPEED
}

fn default_pulse_width() -> Microseconds {
    DEFAULT_PULSE_WIDTH
}

impl MotorConfig {
    /// Create a configuration with defaults for everything but the step count.
    pub fn new(name: &str, steps_per_revolution: f32) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            steps_per_revolution,
            microsteps: Microsteps::FULL,
            initial_speed: DEFAULT_INITIAL_SPEED,
            pulse_width: DEFAULT_PULSE_WIDTH,
            invert_direction: false,
        }
    }

    /// Calculate total steps per output shaft revolution.
    pub fn total_steps_per_revolution(&self) -> f32 {
        self.steps_per_revolution * self.microsteps.value() as f32
    }
}
