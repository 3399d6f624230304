//! Public async handle to a running stepper.

use std::sync::Arc;

use embedded_hal::digital::{OutputPin, StatefulOutputPin};
use tokio::sync::{mpsc, oneshot, watch, Notify};
use tokio::task::JoinHandle;

use crate::config::units::{Revolutions, RevolutionsPerSec, Steps};
use crate::config::{validate_motor, MotorConfig};
use crate::error::{MotorError, Result};
use crate::motion::{MotorMode, TickInterval};
use crate::motor::{StepperBuilder, StepperDriver};

use super::pulse::PulseTimer;
use super::ticker::TickSource;
use super::worker::{Command, Request, Snapshot, Worker};

/// Depth of the command queue between handle and worker.
const COMMAND_QUEUE_DEPTH: usize = 16;

/// Handle to a stepper driven by its own tick source and worker task.
///
/// Commands are sent to the worker and acknowledged once applied, so a read
/// after an awaited command always reflects it. Dropping the handle stops
/// the worker; [`Stepper::shutdown`] does the same and waits for it.
///
/// # Example
///
/// ```rust,ignore
/// let config = tick_stepper::MotorConfig::new("spindle", 200.0);
/// let stepper = Stepper::from_config(&config, step_pin, dir_pin)?;
///
/// stepper.set_absolute_revolutions(2.5.revolutions()).await?;
/// stepper.wait_idle().await?;
/// assert_eq!(stepper.position(), Steps(500));
/// ```
#[derive(Debug)]
pub struct Stepper {
    name: heapless::String<32>,
    requests: mpsc::Sender<Request>,
    status: watch::Receiver<Snapshot>,
    worker: Option<JoinHandle<()>>,
}

impl Stepper {
    /// Start the tick source and worker for a driver.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn<STEP, DIR>(driver: StepperDriver<PulseTimer<STEP>, DIR>) -> Self
    where
        STEP: OutputPin + Send + 'static,
        DIR: StatefulOutputPin + Send + 'static,
    {
        let name = heapless::String::try_from(driver.name()).unwrap_or_default();
        let wake = Arc::new(Notify::new());
        let ticker = TickSource::spawn(driver.tick_interval().into(), Arc::clone(&wake));
        let (requests, requests_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (status_tx, status) = watch::channel(Snapshot::of(&driver));

        let worker = Worker::new(driver, ticker, wake, requests_rx, status_tx);
        let worker = tokio::spawn(worker.run());

        Self {
            name,
            requests,
            status,
            worker: Some(worker),
        }
    }

    /// Build a driver from configuration and start it.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or a pin cannot be driven.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn from_config<STEP, DIR>(config: &MotorConfig, step_pin: STEP, dir_pin: DIR) -> Result<Self>
    where
        STEP: OutputPin + Send + 'static,
        DIR: StatefulOutputPin + Send + 'static,
    {
        validate_motor(config)?;
        let driver = StepperBuilder::new()
            .pulse(PulseTimer::new(step_pin, config.pulse_width))
            .dir_pin(dir_pin)
            .from_motor_config(config)
            .build()?;

        Ok(Self::spawn(driver))
    }

    /// Get the motor name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Latest published state.
    pub fn snapshot(&self) -> Snapshot {
        *self.status.borrow()
    }

    /// Absolute step count.
    pub fn position(&self) -> Steps {
        self.status.borrow().position
    }

    /// Absolute position in revolutions.
    pub fn rotations(&self) -> Revolutions {
        self.status.borrow().rotations
    }

    /// Commanded speed.
    pub fn speed(&self) -> RevolutionsPerSec {
        self.status.borrow().speed
    }

    /// Last position target.
    pub fn setpoint(&self) -> Steps {
        self.status.borrow().setpoint
    }

    /// Current mode.
    pub fn mode(&self) -> MotorMode {
        self.status.borrow().mode
    }

    /// Tick period for the commanded speed.
    pub fn tick_interval(&self) -> TickInterval {
        self.status.borrow().interval
    }

    /// Whether the worker still accepts commands.
    pub fn is_running(&self) -> bool {
        !self.requests.is_closed()
    }

    /// Write the DIR line directly, bypassing mode logic.
    pub async fn set_direction(&self, clockwise: bool) -> Result<()> {
        self.request(Command::SetDirection(clockwise)).await
    }

    /// Change speed; the sign selects direction. Ends any motion in progress.
    pub async fn set_speed(&self, speed: RevolutionsPerSec) -> Result<()> {
        self.request(Command::SetSpeed(speed)).await
    }

    /// Make the current position the origin.
    pub async fn set_absolute_zero_position(&self) -> Result<()> {
        self.request(Command::SetAbsoluteZeroPosition).await
    }

    /// Redefine the current position in revolutions without moving.
    pub async fn set_position_revolutions(&self, revolutions: Revolutions) -> Result<()> {
        self.request(Command::SetPositionRevolutions(revolutions)).await
    }

    /// Move to an absolute step count.
    pub async fn set_absolute_position(&self, target: Steps) -> Result<()> {
        self.request(Command::SetAbsolutePosition(target)).await
    }

    /// Move by a number of steps.
    pub async fn set_relative_position(&self, delta: Steps) -> Result<()> {
        self.request(Command::SetRelativePosition(delta)).await
    }

    /// Move to an absolute position in revolutions.
    pub async fn set_absolute_revolutions(&self, revolutions: Revolutions) -> Result<()> {
        self.request(Command::SetAbsoluteRevolutions(revolutions)).await
    }

    /// Move by an amount in revolutions.
    pub async fn set_relative_revolutions(&self, revolutions: Revolutions) -> Result<()> {
        self.request(Command::SetRelativeRevolutions(revolutions)).await
    }

    /// Set the speed, then move to an absolute step count.
    ///
    /// Only the magnitude of `speed` matters; the target decides direction.
    pub async fn move_to_position_at(&self, target: Steps, speed: RevolutionsPerSec) -> Result<()> {
        self.request(Command::MoveToPositionAt(target, speed)).await
    }

    /// Set the speed, then move to an absolute position in revolutions.
    pub async fn move_to_revolutions_at(
        &self,
        revolutions: Revolutions,
        speed: RevolutionsPerSec,
    ) -> Result<()> {
        self.request(Command::MoveToRevolutionsAt(revolutions, speed)).await
    }

    /// Rotate continuously at the commanded speed.
    pub async fn start_rotation(&self) -> Result<()> {
        self.request(Command::StartRotation).await
    }

    /// Stop continuous rotation; one more pulse may follow.
    pub async fn stop_rotation(&self) -> Result<()> {
        self.request(Command::StopRotation).await
    }

    /// Wait until the motor is idle.
    pub async fn wait_idle(&self) -> Result<()> {
        let mut status = self.status.clone();
        status
            .wait_for(|s| s.mode == MotorMode::Idle)
            .await
            .map(|_| ())
            .map_err(|_| MotorError::WorkerStopped.into())
    }

    /// Stop the tick source and pending pulse, then wait for the worker.
    pub async fn shutdown(mut self) -> Result<()> {
        let (respond_to, response) = oneshot::channel();
        self.requests
            .send(Request::Shutdown { respond_to })
            .await
            .map_err(|_| MotorError::WorkerStopped)?;
        let result = response.await.map_err(|_| MotorError::WorkerStopped)?;

        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
        result
    }

    async fn request(&self, command: Command) -> Result<()> {
        let (respond_to, response) = oneshot::channel();
        self.requests
            .send(Request::Apply { command, respond_to })
            .await
            .map_err(|_| MotorError::WorkerStopped)?;
        response.await.map_err(|_| MotorError::WorkerStopped)?
    }
}
