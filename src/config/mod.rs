//! Configuration module for tick-stepper.
//!
//! Provides types for loading and validating motor configurations
//! from TOML files (with `std` feature) or pre-parsed data.

mod motor;
mod system;
mod timing;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use motor::{MotorConfig, DEFAULT_INITIAL_SPEED, DEFAULT_PULSE_WIDTH};
pub use system::SystemConfig;
pub use timing::TimingConstraints;
pub use validation::{validate_config, validate_motor};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Microseconds, Microsteps, Revolutions, RevolutionsPerSec, Steps};
