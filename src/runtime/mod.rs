//! Tokio runtime for tick-stepper (std only).
//!
//! Three timing contexts cooperate per motor:
//!
//! - [`TickSource`]: a periodic task that only wakes the worker
//! - the worker: sole owner of the driver, one dispatch per wake, plus
//!   every command sent through a [`Stepper`] handle
//! - [`PulseTimer`]: one-shot tasks that drop the STEP line after each pulse
//!
//! Readers see a [`Snapshot`] published by the worker after every change.

mod handle;
mod pulse;
mod ticker;
mod worker;

pub use handle::Stepper;
pub use pulse::{PulseTimer, TIMER_RESOLUTION};
pub use ticker::TickSource;
pub use worker::Snapshot;
