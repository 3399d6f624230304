//! Operating modes of the motion state machine.

/// What the worker does on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorMode {
    /// Holding still, step line low. Initial and only resting mode.
    #[default]
    Idle,
    /// Stepping toward the setpoint, one step per tick.
    PositionTarget,
    /// Stepping every tick until a stop is requested.
    Velocity,
    /// Tick source is being rearmed after a speed change.
    Stopping,
}

impl MotorMode {
    /// Mode name for display/debugging.
    pub fn name(self) -> &'static str {
        match self {
            MotorMode::Idle => "Idle",
            MotorMode::PositionTarget => "PositionTarget",
            MotorMode::Velocity => "Velocity",
            MotorMode::Stopping => "Stopping",
        }
    }

    /// Whether ticks in this mode can emit pulses.
    #[inline]
    pub fn is_moving(self) -> bool {
        matches!(self, MotorMode::PositionTarget | MotorMode::Velocity)
    }
}

impl core::fmt::Display for MotorMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
