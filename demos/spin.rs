//! Spin a simulated motor through the async API.
//!
//! Loads a motor from inline TOML, runs a position move, a speed change and a
//! short continuous rotation, then shuts down. The pins only count edges, so
//! this runs without hardware:
//!
//! ```text
//! cargo run --example spin
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tick_stepper::config::units::{Revolutions, Steps, UnitExt};
use tick_stepper::{parse_config, Stepper};

const CONFIG: &str = r#"
[motors.spindle]
name = "spindle"
steps_per_revolution = 200
initial_speed_rev_per_sec = 1.0
pulse_width_us = 10
"#;

/// Simulated pin: tracks its level and counts rising edges.
#[derive(Clone, Default)]
struct SimPin {
    level: Arc<AtomicBool>,
    rising: Arc<AtomicUsize>,
}

impl SimPin {
    fn rising_edges(&self) -> usize {
        self.rising.load(Ordering::Relaxed)
    }
}

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.level.swap(true, Ordering::Relaxed) {
            self.rising.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

impl embedded_hal::digital::StatefulOutputPin for SimPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level.load(Ordering::Relaxed))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level.load(Ordering::Relaxed))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = parse_config(CONFIG)?;
    let motor = config.motor("spindle").ok_or("spindle missing from config")?;

    let step = SimPin::default();
    let stepper = Stepper::from_config(motor, step.clone(), SimPin::default())?;
    tracing::info!(
        motor = stepper.name(),
        interval_us = stepper.tick_interval().micros().value(),
        "stepper ready"
    );

    // Quarter turn forward at 1 rev/s
    stepper.set_relative_revolutions(Revolutions(0.25)).await?;
    stepper.wait_idle().await?;
    tracing::info!(position = stepper.position().value(), "quarter turn done");

    // Back to zero twice as fast
    stepper.move_to_position_at(Steps(0), 2.0.rev_per_sec()).await?;
    stepper.wait_idle().await?;
    tracing::info!(position = stepper.position().value(), "back at origin");

    // Spin backwards for half a second
    stepper.set_speed((-2.0).rev_per_sec()).await?;
    stepper.start_rotation().await?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    stepper.stop_rotation().await?;
    stepper.wait_idle().await?;

    let snapshot = stepper.snapshot();
    tracing::info!(
        position = snapshot.position.value(),
        rotations = snapshot.rotations.value(),
        pulses = step.rising_edges(),
        "rotation stopped"
    );

    stepper.shutdown().await?;
    Ok(())
}
