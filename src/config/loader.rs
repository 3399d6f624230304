//! Motor tables from TOML files (std only).
//!
//! A file holds one `[motors.<key>]` table per motor. The key is how the
//! motor is looked up in [`SystemConfig::motor`]; everything else maps onto
//! [`MotorConfig`](super::MotorConfig):
//!
//! | field                       | required | default |
//! |-----------------------------|----------|---------|
//! | `name`                      | yes      |         |
//! | `steps_per_revolution`      | yes      |         |
//! | `microsteps`                | no       | `1`     |
//! | `initial_speed_rev_per_sec` | no       | `1.0`   |
//! | `pulse_width_us`            | no       | `10`    |
//! | `invert_direction`          | no       | `false` |
//!
//! ```toml
//! [motors.spindle]
//! name = "spindle"
//! steps_per_revolution = 200
//! microsteps = 8
//! initial_speed_rev_per_sec = -0.5
//! ```
//!
//! Every motor goes through [`validate_motor`](super::validate_motor) before
//! the table is handed out. The runtime pulse timer may still refuse an
//! initial speed that only an exact pulse generator could reach.

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Read and validate a motor file.
///
/// # Errors
///
/// `IoError` if the file cannot be read, then anything [`parse_config`]
/// reports.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| config_error(ConfigError::IoError, &e.to_string()))?;

    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), motors = config.motors.len(), "loaded motor tables");
    Ok(config)
}

/// Parse and validate motor tables held in memory.
///
/// # Errors
///
/// `ParseError` for malformed TOML, unknown `microsteps` values or missing
/// required fields; the motor's validation error otherwise.
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config: SystemConfig =
        toml::from_str(content).map_err(|e| config_error(ConfigError::ParseError, e.message()))?;

    super::validation::validate_config(&config)?;
    Ok(config)
}

// Messages longer than the error buffer are dropped rather than cut mid-char.
fn config_error(kind: fn(heapless::String<128>) -> ConfigError, message: &str) -> Error {
    Error::Config(kind(heapless::String::try_from(message).unwrap_or_default()))
}
