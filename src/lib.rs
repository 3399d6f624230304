//! # tick-stepper
//!
//! Tick-driven stepper motor control with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Position and velocity modes**: absolute/relative targets in steps or
//!   revolutions, or continuous rotation until stopped
//! - **embedded-hal 1.0**: `OutputPin` for STEP, `StatefulOutputPin` for DIR
//! - **no_std core**: [`StepperDriver`] runs one state-machine step per
//!   [`dispatch`](StepperDriver::dispatch), callable from a timer interrupt
//! - **Tokio runtime** (`std`): periodic tick source, worker task and
//!   one-shot pulse timer behind an async [`Stepper`] handle
//! - **Configuration-driven**: motors described in TOML files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tick_stepper::{Stepper, SystemConfig};
//! use tick_stepper::config::units::UnitExt;
//!
//! let config: SystemConfig = tick_stepper::load_config("motors.toml")?;
//! let motor = config.motor("spindle").unwrap();
//!
//! let stepper = Stepper::from_config(motor, step_pin, dir_pin)?;
//! stepper.set_speed(2.0.rev_per_sec()).await?;
//! stepper.set_relative_revolutions(10.0.revolutions()).await?;
//! stepper.wait_idle().await?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): TOML loading and the Tokio runtime
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Core modules
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;
#[cfg(feature = "std")]
pub mod runtime;

// Re-exports for ergonomic API
pub use config::{validate_config, MotorConfig, SystemConfig, TimingConstraints};
pub use error::{Error, Result};
pub use motion::{Direction, MotionStateMachine, MotorMode, TickInterval};
pub use motor::{BlockingPulse, StepPulse, StepperBuilder, StepperDriver};

#[cfg(feature = "std")]
pub use runtime::{PulseTimer, Snapshot, Stepper};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Microseconds, Microsteps, Revolutions, RevolutionsPerSec, Steps};
