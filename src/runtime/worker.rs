//! The worker task.
//!
//! Owns the [`StepperDriver`] and is the only code that mutates it. It waits
//! for either a tick wake or a command; a wake runs exactly one dispatch, a
//! command is applied and acknowledged. After each of them the latest
//! [`Snapshot`] is published for readers.

use std::sync::Arc;

use embedded_hal::digital::{OutputPin, StatefulOutputPin};
use tokio::sync::{mpsc, oneshot, watch, Notify};

use crate::config::units::{Revolutions, RevolutionsPerSec, Steps};
use crate::error::{CommandError, Result};
use crate::motion::{MotorMode, TickInterval};
use crate::motor::StepperDriver;

use super::pulse::PulseTimer;
use super::ticker::TickSource;

/// Commands accepted by the worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Command {
    SetDirection(bool),
    SetSpeed(RevolutionsPerSec),
    SetAbsoluteZeroPosition,
    SetPositionRevolutions(Revolutions),
    SetAbsolutePosition(Steps),
    SetRelativePosition(Steps),
    SetAbsoluteRevolutions(Revolutions),
    SetRelativeRevolutions(Revolutions),
    MoveToPositionAt(Steps, RevolutionsPerSec),
    MoveToRevolutionsAt(Revolutions, RevolutionsPerSec),
    StartRotation,
    StopRotation,
}

/// Messages on the worker's inbound channel.
#[derive(Debug)]
pub(crate) enum Request {
    Apply {
        command: Command,
        respond_to: oneshot::Sender<Result<()>>,
    },
    Shutdown {
        respond_to: oneshot::Sender<Result<()>>,
    },
}

/// Point-in-time view of a motor, published after every change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// Current mode.
    pub mode: MotorMode,
    /// Absolute step count.
    pub position: Steps,
    /// Absolute position in revolutions.
    pub rotations: Revolutions,
    /// Last position target.
    pub setpoint: Steps,
    /// Commanded speed.
    pub speed: RevolutionsPerSec,
    /// Tick period for the commanded speed.
    pub interval: TickInterval,
}

impl Snapshot {
    pub(crate) fn of<STEP, DIR>(driver: &StepperDriver<PulseTimer<STEP>, DIR>) -> Self
    where
        STEP: OutputPin + Send + 'static,
        DIR: StatefulOutputPin,
    {
        Self {
            mode: driver.mode(),
            position: driver.position(),
            rotations: driver.rotations(),
            setpoint: driver.setpoint(),
            speed: driver.speed(),
            interval: driver.tick_interval(),
        }
    }
}

pub(crate) struct Worker<STEP, DIR>
where
    STEP: OutputPin + Send + 'static,
    DIR: StatefulOutputPin + Send + 'static,
{
    driver: StepperDriver<PulseTimer<STEP>, DIR>,
    ticker: TickSource,
    wake: Arc<Notify>,
    requests: mpsc::Receiver<Request>,
    status: watch::Sender<Snapshot>,
}

impl<STEP, DIR> Worker<STEP, DIR>
where
    STEP: OutputPin + Send + 'static,
    DIR: StatefulOutputPin + Send + 'static,
{
    pub(crate) fn new(
        driver: StepperDriver<PulseTimer<STEP>, DIR>,
        ticker: TickSource,
        wake: Arc<Notify>,
        requests: mpsc::Receiver<Request>,
        status: watch::Sender<Snapshot>,
    ) -> Self {
        Self {
            driver,
            ticker,
            wake,
            requests,
            status,
        }
    }

    /// Serve wakes and commands until shut down or every handle is gone.
    pub(crate) async fn run(mut self) {
        tracing::info!(
            motor = self.driver.name(),
            interval_us = self.driver.tick_interval().micros().value(),
            "stepper worker started"
        );
        let wake = Arc::clone(&self.wake);

        loop {
            tokio::select! {
                biased;

                _ = wake.notified() => self.on_tick(),
                request = self.requests.recv() => match request {
                    Some(Request::Apply { command, respond_to }) => {
                        let result = self.apply(command);
                        self.publish();
                        let _ = respond_to.send(result);
                    }
                    Some(Request::Shutdown { respond_to }) => {
                        let _ = respond_to.send(self.teardown());
                        return;
                    }
                    None => {
                        let _ = self.teardown();
                        return;
                    }
                },
            }
        }
    }

    fn on_tick(&mut self) {
        let before = self.driver.mode();
        match self.driver.dispatch() {
            Ok(_) => {
                let after = self.driver.mode();
                if before != after {
                    tracing::trace!(
                        motor = self.driver.name(),
                        from = before.name(),
                        to = after.name(),
                        position = self.driver.position().value(),
                        "mode transition"
                    );
                }
            }
            Err(e) => tracing::warn!(motor = self.driver.name(), error = %e, "dispatch failed"),
        }
        self.publish();
    }

    fn apply(&mut self, command: Command) -> Result<()> {
        tracing::debug!(motor = self.driver.name(), ?command, "applying command");

        let result = match command {
            Command::SetDirection(clockwise) => self.driver.set_direction(clockwise),
            Command::SetSpeed(speed) => self.change_speed(speed),
            Command::SetAbsoluteZeroPosition => {
                self.driver.set_absolute_zero_position();
                Ok(())
            }
            Command::SetPositionRevolutions(revolutions) => {
                self.driver.set_position_revolutions(revolutions)
            }
            Command::SetAbsolutePosition(target) => self.driver.set_absolute_position(target),
            Command::SetRelativePosition(delta) => self.driver.set_relative_position(delta),
            Command::SetAbsoluteRevolutions(revolutions) => {
                self.driver.set_absolute_revolutions(revolutions)
            }
            Command::SetRelativeRevolutions(revolutions) => {
                self.driver.set_relative_revolutions(revolutions)
            }
            Command::MoveToPositionAt(target, speed) => self
                .change_speed(speed)
                .and_then(|_| self.driver.set_absolute_position(target)),
            Command::MoveToRevolutionsAt(revolutions, speed) => {
                if !revolutions.0.is_finite() {
                    return Err(CommandError::NonFiniteRevolutions(revolutions.0).into());
                }
                self.change_speed(speed)
                    .and_then(|_| self.driver.set_absolute_revolutions(revolutions))
            }
            Command::StartRotation => {
                self.driver.start_rotation();
                Ok(())
            }
            Command::StopRotation => {
                self.driver.stop_rotation();
                Ok(())
            }
        };

        if let Err(ref e) = result {
            tracing::debug!(motor = self.driver.name(), error = %e, "command rejected");
        }
        result
    }

    /// Speed change: driver enters `Stopping`, the tick source is rearmed,
    /// then the driver settles in `Idle`. Nothing can observe the
    /// intermediate state because this runs to completion on the worker.
    fn change_speed(&mut self, speed: RevolutionsPerSec) -> Result<()> {
        let interval = self.driver.set_speed(speed)?;
        self.ticker.rearm(interval.into());
        self.driver.rearmed();
        Ok(())
    }

    fn teardown(&mut self) -> Result<()> {
        self.ticker.stop();
        let result = self.driver.halt();
        self.publish();
        tracing::info!(
            motor = self.driver.name(),
            position = self.driver.position().value(),
            "stepper worker stopped"
        );
        result
    }

    fn publish(&self) {
        let next = Snapshot::of(&self.driver);
        self.status.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
