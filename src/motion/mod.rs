//! Motion module for tick-stepper.
//!
//! Provides the mode state machine and the speed to tick-interval math.

mod direction;
mod interval;
mod machine;
mod mode;

pub use direction::Direction;
pub use interval::TickInterval;
pub use machine::{MotionStateMachine, TickAction};
pub use mode::MotorMode;
