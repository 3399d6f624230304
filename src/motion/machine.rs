//! The motion state machine.
//!
//! Pure state: no pins, no timers. The driver asks it what to do on each
//! tick ([`MotionStateMachine::next_action`]) and reports every emitted pulse
//! back ([`MotionStateMachine::record_pulse`]).

use crate::config::units::{Revolutions, RevolutionsPerSec, Steps};
use crate::config::TimingConstraints;
use crate::error::{CommandError, ConfigError, Error, Result};
use crate::motor::Position;

use super::direction::Direction;
use super::interval::TickInterval;
use super::mode::MotorMode;

/// Action the driver must perform for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Keep the step line deasserted.
    Hold,
    /// Emit one step pulse.
    Step,
}

/// Mode, position, setpoint and speed of one motor.
#[derive(Debug, Clone)]
pub struct MotionStateMachine {
    mode: MotorMode,
    position: Position,
    setpoint: Steps,
    speed: RevolutionsPerSec,
    interval: TickInterval,
    stop_requested: bool,
    timing: TimingConstraints,
}

impl MotionStateMachine {
    /// Create an idle state machine at position zero.
    ///
    /// # Errors
    ///
    /// Fails if steps per revolution is not positive, the pulse width is zero,
    /// or the initial speed has no valid tick interval.
    pub fn new(timing: TimingConstraints, initial_speed: RevolutionsPerSec) -> Result<Self> {
        let steps = timing.steps_per_revolution;
        if !steps.is_finite() || steps <= 0.0 {
            return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(steps)));
        }
        if timing.pulse_width.0 == 0 {
            return Err(Error::Config(ConfigError::InvalidPulseWidth(0)));
        }

        let interval = TickInterval::from_speed(initial_speed, &timing)
            .map_err(|_| Error::Config(ConfigError::InvalidInitialSpeed(initial_speed.0)))?;

        Ok(Self {
            mode: MotorMode::Idle,
            position: Position::new(steps),
            setpoint: Steps::default(),
            speed: initial_speed,
            interval,
            stop_requested: false,
            timing,
        })
    }

    /// Current mode.
    #[inline]
    pub fn mode(&self) -> MotorMode {
        self.mode
    }

    /// Absolute step count.
    #[inline]
    pub fn position(&self) -> Steps {
        self.position.steps()
    }

    /// Absolute position in revolutions.
    #[inline]
    pub fn rotations(&self) -> Revolutions {
        self.position.revolutions()
    }

    /// Last target of a position command.
    #[inline]
    pub fn setpoint(&self) -> Steps {
        self.setpoint
    }

    /// Commanded speed, sign included.
    #[inline]
    pub fn speed(&self) -> RevolutionsPerSec {
        self.speed
    }

    /// Period of the tick source for the commanded speed.
    #[inline]
    pub fn interval(&self) -> TickInterval {
        self.interval
    }

    /// Whether a stop has been requested and not yet cleared.
    #[inline]
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Timing constraints this machine was built with.
    #[inline]
    pub fn timing(&self) -> &TimingConstraints {
        &self.timing
    }

    /// Check a speed without applying it.
    ///
    /// Returns the direction and tick interval the speed would set.
    pub fn plan_speed(
        &self,
        speed: RevolutionsPerSec,
    ) -> core::result::Result<(Direction, TickInterval), CommandError> {
        let interval = TickInterval::from_speed(speed, &self.timing)?;
        Ok((Direction::from_speed(speed), interval))
    }

    /// Begin a speed change.
    ///
    /// On success the machine is in `Stopping` until [`finish_reconfigure`]
    /// is called or the next tick is dispatched. A rejected speed changes
    /// nothing.
    ///
    /// [`finish_reconfigure`]: MotionStateMachine::finish_reconfigure
    pub fn set_speed(
        &mut self,
        speed: RevolutionsPerSec,
    ) -> core::result::Result<(Direction, TickInterval), CommandError> {
        let (direction, interval) = self.plan_speed(speed)?;
        self.apply_speed(speed, interval);
        Ok((direction, interval))
    }

    /// Commit a speed already checked with [`plan_speed`](Self::plan_speed).
    pub(crate) fn apply_speed(&mut self, speed: RevolutionsPerSec, interval: TickInterval) {
        self.speed = speed;
        self.interval = interval;
        self.transition(MotorMode::Stopping);
    }

    /// Complete a speed change once the tick source has been rearmed.
    pub fn finish_reconfigure(&mut self) {
        if self.mode == MotorMode::Stopping {
            self.transition(MotorMode::Idle);
        }
    }

    /// Make the current position the origin.
    pub fn set_zero(&mut self) {
        self.position.set_origin();
    }

    /// Redefine the current position without moving.
    pub fn set_position_revolutions(
        &mut self,
        revolutions: Revolutions,
    ) -> core::result::Result<(), CommandError> {
        check_finite(revolutions)?;
        self.position.set_revolutions(revolutions);
        Ok(())
    }

    /// Target an absolute step count.
    ///
    /// Returns the direction the DIR line must be set to.
    pub fn target_absolute(&mut self, target: Steps) -> Direction {
        let direction = self.direction_to(target);
        self.enter_position_target(target);
        direction
    }

    /// Direction of travel from the current position to `target`.
    #[inline]
    pub fn direction_to(&self, target: Steps) -> Direction {
        if self.position() <= target {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }

    /// Convert revolutions to steps for this motor.
    pub fn steps_for(&self, revolutions: Revolutions) -> core::result::Result<Steps, CommandError> {
        check_finite(revolutions)?;
        Ok(Steps::from_revolutions(revolutions, self.timing.steps_per_revolution))
    }

    /// Target a step count relative to the current position.
    pub fn target_relative(&mut self, delta: Steps) -> Direction {
        self.enter_position_target(self.position() + delta);
        Direction::from_steps(delta)
    }

    /// Target an absolute position in revolutions.
    pub fn target_absolute_revolutions(
        &mut self,
        revolutions: Revolutions,
    ) -> core::result::Result<Direction, CommandError> {
        let target = self.steps_for(revolutions)?;
        Ok(self.target_absolute(target))
    }

    /// Target a position in revolutions relative to the current one.
    pub fn target_relative_revolutions(
        &mut self,
        revolutions: Revolutions,
    ) -> core::result::Result<Direction, CommandError> {
        let delta = self.steps_for(revolutions)?;
        Ok(self.target_relative(delta))
    }

    /// Start continuous rotation at the commanded speed.
    pub fn start_rotation(&mut self) {
        self.stop_requested = false;
        self.transition(MotorMode::Velocity);
    }

    /// Request continuous rotation to stop after the next pulse.
    pub fn stop_rotation(&mut self) {
        self.stop_requested = true;
    }

    /// Decide what the current tick does.
    pub fn next_action(&mut self) -> TickAction {
        match self.mode {
            MotorMode::Idle => TickAction::Hold,
            MotorMode::Stopping => {
                self.transition(MotorMode::Idle);
                TickAction::Hold
            }
            MotorMode::PositionTarget => {
                if self.position() == self.setpoint {
                    self.transition(MotorMode::Idle);
                    TickAction::Hold
                } else {
                    TickAction::Step
                }
            }
            MotorMode::Velocity => TickAction::Step,
        }
    }

    /// Account for a pulse emitted in `direction` and apply the resulting
    /// transition.
    pub fn record_pulse(&mut self, direction: Direction) {
        self.position.move_steps(direction.sign());

        match self.mode {
            MotorMode::PositionTarget if self.position() == self.setpoint => {
                self.transition(MotorMode::Idle);
            }
            MotorMode::Velocity if self.stop_requested => {
                self.transition(MotorMode::Idle);
            }
            _ => {}
        }
    }

    fn enter_position_target(&mut self, target: Steps) {
        self.stop_requested = false;
        self.setpoint = target;
        if self.position() == target {
            self.transition(MotorMode::Idle);
        } else {
            self.transition(MotorMode::PositionTarget);
        }
    }

    fn transition(&mut self, to: MotorMode) {
        #[cfg(feature = "defmt")]
        defmt::debug!("mode {} -> {}", self.mode, to);
        self.mode = to;
    }
}

fn check_finite(revolutions: Revolutions) -> core::result::Result<(), CommandError> {
    if revolutions.0.is_finite() {
        Ok(())
    } else {
        Err(CommandError::NonFiniteRevolutions(revolutions.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::Microseconds;

    fn machine() -> MotionStateMachine {
        let timing = TimingConstraints::new(200.0, Microseconds(10), false);
        MotionStateMachine::new(timing, RevolutionsPerSec(1.0)).unwrap()
    }

    /// Dispatch ticks until idle, returning the number of ticks taken.
    fn run_to_idle(m: &mut MotionStateMachine, direction: Direction) -> u32 {
        let mut ticks = 0;
        while m.mode() != MotorMode::Idle {
            ticks += 1;
            if m.next_action() == TickAction::Step {
                m.record_pulse(direction);
            }
            assert!(ticks < 100_000, "state machine did not settle");
        }
        ticks
    }

    #[test]
    fn test_new_rejects_bad_steps() {
        let timing = TimingConstraints::new(0.0, Microseconds(10), false);
        assert!(matches!(
            MotionStateMachine::new(timing, RevolutionsPerSec(1.0)),
            Err(Error::Config(ConfigError::InvalidStepsPerRevolution(_)))
        ));
    }

    #[test]
    fn test_new_rejects_zero_speed() {
        let timing = TimingConstraints::new(200.0, Microseconds(10), false);
        assert!(matches!(
            MotionStateMachine::new(timing, RevolutionsPerSec(0.0)),
            Err(Error::Config(ConfigError::InvalidInitialSpeed(_)))
        ));
    }

    #[test]
    fn test_initial_state() {
        let m = machine();
        assert_eq!(m.mode(), MotorMode::Idle);
        assert_eq!(m.position(), Steps(0));
        assert_eq!(m.interval().micros(), Microseconds(5000));
    }

    #[test]
    fn test_position_target_takes_exact_ticks() {
        let mut m = machine();
        let dir = m.target_absolute(Steps(10));
        assert_eq!(dir, Direction::Clockwise);
        assert_eq!(m.mode(), MotorMode::PositionTarget);

        assert_eq!(run_to_idle(&mut m, dir), 10);
        assert_eq!(m.position(), Steps(10));
    }

    #[test]
    fn test_target_at_current_position_stays_idle() {
        let mut m = machine();
        m.target_relative(Steps(0));
        assert_eq!(m.mode(), MotorMode::Idle);
        assert_eq!(m.next_action(), TickAction::Hold);
    }

    #[test]
    fn test_relative_negative_target() {
        let mut m = machine();
        let dir = m.target_relative(Steps(-3));
        assert_eq!(dir, Direction::CounterClockwise);
        assert_eq!(m.setpoint(), Steps(-3));
        assert_eq!(run_to_idle(&mut m, dir), 3);
        assert_eq!(m.position(), Steps(-3));
    }

    #[test]
    fn test_new_target_overwrites_pending_one() {
        let mut m = machine();
        m.target_absolute(Steps(100));
        for _ in 0..5 {
            assert_eq!(m.next_action(), TickAction::Step);
            m.record_pulse(Direction::Clockwise);
        }
        let dir = m.target_absolute(Steps(2));
        assert_eq!(dir, Direction::CounterClockwise);
        assert_eq!(m.setpoint(), Steps(2));
        assert_eq!(run_to_idle(&mut m, dir), 3);
    }

    #[test]
    fn test_velocity_emits_one_pulse_after_stop() {
        let mut m = machine();
        m.start_rotation();
        for _ in 0..4 {
            assert_eq!(m.next_action(), TickAction::Step);
            m.record_pulse(Direction::Clockwise);
        }
        m.stop_rotation();
        m.stop_rotation();
        assert_eq!(m.mode(), MotorMode::Velocity);

        assert_eq!(m.next_action(), TickAction::Step);
        m.record_pulse(Direction::Clockwise);
        assert_eq!(m.mode(), MotorMode::Idle);
        assert_eq!(m.position(), Steps(5));
    }

    #[test]
    fn test_start_clears_stop_request() {
        let mut m = machine();
        m.stop_rotation();
        m.start_rotation();
        assert!(!m.stop_requested());
        m.next_action();
        m.record_pulse(Direction::Clockwise);
        assert_eq!(m.mode(), MotorMode::Velocity);
    }

    #[test]
    fn test_set_speed_passes_through_stopping() {
        let mut m = machine();
        m.start_rotation();

        let (dir, interval) = m.set_speed(RevolutionsPerSec(-2.0)).unwrap();
        assert_eq!(dir, Direction::CounterClockwise);
        assert_eq!(interval.micros(), Microseconds(2500));
        assert_eq!(m.mode(), MotorMode::Stopping);

        m.finish_reconfigure();
        assert_eq!(m.mode(), MotorMode::Idle);
        assert_eq!(m.speed(), RevolutionsPerSec(-2.0));
    }

    #[test]
    fn test_plan_speed_leaves_state() {
        let mut m = machine();
        m.start_rotation();
        let (dir, interval) = m.plan_speed(RevolutionsPerSec(-4.0)).unwrap();
        assert_eq!(dir, Direction::CounterClockwise);
        assert_eq!(interval.micros(), Microseconds(1250));
        assert_eq!(m.mode(), MotorMode::Velocity);
        assert_eq!(m.speed(), RevolutionsPerSec(1.0));
        assert_eq!(m.interval().micros(), Microseconds(5000));
    }

    #[test]
    fn test_stopping_settles_on_next_tick() {
        let mut m = machine();
        m.set_speed(RevolutionsPerSec(2.0)).unwrap();
        assert_eq!(m.next_action(), TickAction::Hold);
        assert_eq!(m.mode(), MotorMode::Idle);
    }

    #[test]
    fn test_rejected_speed_changes_nothing() {
        let mut m = machine();
        m.start_rotation();
        assert_eq!(m.set_speed(RevolutionsPerSec(0.0)), Err(CommandError::ZeroSpeed));
        assert_eq!(m.mode(), MotorMode::Velocity);
        assert_eq!(m.speed(), RevolutionsPerSec(1.0));
        assert_eq!(m.interval().micros(), Microseconds(5000));
    }

    #[test]
    fn test_revolution_targets() {
        let mut m = machine();
        m.target_absolute_revolutions(Revolutions(1.5)).unwrap();
        assert_eq!(m.setpoint(), Steps(300));

        m.set_zero();
        m.target_relative_revolutions(Revolutions(-0.5)).unwrap();
        assert_eq!(m.setpoint(), Steps(-99));

        assert!(matches!(
            m.target_absolute_revolutions(Revolutions(f32::NAN)),
            Err(CommandError::NonFiniteRevolutions(_))
        ));
    }

    #[test]
    fn test_zero_and_redefine_position() {
        let mut m = machine();
        m.target_absolute(Steps(7));
        run_to_idle(&mut m, Direction::Clockwise);

        m.set_zero();
        assert_eq!(m.position(), Steps(0));
        assert_eq!(m.rotations(), Revolutions(0.0));

        m.set_position_revolutions(Revolutions(2.0)).unwrap();
        assert_eq!(m.position(), Steps(400));
    }
}
