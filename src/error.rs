//! Error types for tick-stepper.
//!
//! Provides unified error handling across configuration, pin I/O and motion commands.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all tick-stepper operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor hardware or worker error
    Motor(MotorError),
    /// Rejected motion command
    Command(CommandError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Steps per revolution must be finite and > 0
    InvalidStepsPerRevolution(f32),
    /// Pulse width must be > 0 µs
    InvalidPulseWidth(u32),
    /// Initial speed is not a usable speed for this motor
    InvalidInitialSpeed(f32),
    /// Motor name not found in configuration
    MotorNotFound(heapless::String<32>),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor hardware and worker errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// Pin operation failed
    PinError,
    /// The worker task has shut down and no longer accepts commands
    WorkerStopped,
}

/// Errors for commands rejected at the API boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// A speed of zero has no tick interval
    ZeroSpeed,
    /// Speed is NaN or infinite
    NonFiniteSpeed(f32),
    /// Speed would make the tick interval no longer than the step pulse
    SpeedTooHigh {
        /// Requested speed magnitude in rev/s
        requested: f32,
        /// Largest accepted speed magnitude in rev/s
        max: f32,
    },
    /// Revolution target is NaN or infinite
    NonFiniteRevolutions(f32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Command(e) => write!(f, "Command rejected: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidStepsPerRevolution(v) => {
                write!(f, "Invalid steps per revolution: {}. Must be > 0", v)
            }
            ConfigError::InvalidPulseWidth(v) => write!(f, "Invalid pulse width: {} us. Must be > 0", v),
            ConfigError::InvalidInitialSpeed(v) => write!(f, "Invalid initial speed: {} rev/s", v),
            ConfigError::MotorNotFound(name) => write!(f, "Motor '{}' not found", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
            MotorError::WorkerStopped => write!(f, "Stepper worker has stopped"),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::ZeroSpeed => write!(f, "Speed must be non-zero"),
            CommandError::NonFiniteSpeed(v) => write!(f, "Speed {} is not finite", v),
            CommandError::SpeedTooHigh { requested, max } => {
                write!(f, "Speed {} rev/s exceeds maximum {} rev/s", requested, max)
            }
            CommandError::NonFiniteRevolutions(v) => write!(f, "Revolutions {} is not finite", v),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}
