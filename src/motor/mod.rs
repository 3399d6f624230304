//! Motor module for tick-stepper.
//!
//! Provides the stepper driver, its builder, step pulse generation and
//! position tracking.

mod builder;
mod driver;
mod position;
mod pulse;

pub use builder::StepperBuilder;
pub use driver::StepperDriver;
pub use position::Position;
pub use pulse::{BlockingPulse, StepPulse};
