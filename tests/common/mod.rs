//! Shared test pins.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use tick_stepper::config::units::Microseconds;
use tick_stepper::StepPulse;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct PinLog {
    level: bool,
    edges: Vec<(Instant, bool)>,
    fail_writes: bool,
    fail_reads: bool,
}

/// Output pin that records every level change with a timestamp.
///
/// Clones share the same log, so a test keeps one clone to inspect while the
/// driver owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingPin {
    log: Arc<Mutex<PinLog>>,
}

impl RecordingPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> bool {
        self.log.lock().unwrap().level
    }

    pub fn edges(&self) -> Vec<(Instant, bool)> {
        self.log.lock().unwrap().edges.clone()
    }

    pub fn rising_edges(&self) -> usize {
        self.edges().iter().filter(|(_, high)| *high).count()
    }

    /// Make every later write fail, leaving the level untouched.
    pub fn fail_writes(&self, fail: bool) {
        self.log.lock().unwrap().fail_writes = fail;
    }

    /// Make every later level read-back fail.
    pub fn fail_reads(&self, fail: bool) {
        self.log.lock().unwrap().fail_reads = fail;
    }

    fn write(&self, high: bool) -> Result<(), PinFault> {
        let mut log = self.log.lock().unwrap();
        if log.fail_writes {
            return Err(PinFault);
        }
        if log.level != high {
            log.level = high;
            log.edges.push((Instant::now(), high));
        }
        Ok(())
    }

    fn read(&self) -> Result<bool, PinFault> {
        let log = self.log.lock().unwrap();
        if log.fail_reads {
            Err(PinFault)
        } else {
            Ok(log.level)
        }
    }
}

impl ErrorType for RecordingPin {
    type Error = PinFault;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        self.write(true)
    }
}

impl StatefulOutputPin for RecordingPin {
    fn is_set_high(&mut self) -> Result<bool, PinFault> {
        self.read()
    }

    fn is_set_low(&mut self) -> Result<bool, PinFault> {
        self.read().map(|high| !high)
    }
}

/// Pin whose writes always fail.
#[derive(Debug, Default)]
pub struct FaultyPin;

#[derive(Debug)]
pub struct PinFault;

impl embedded_hal::digital::Error for PinFault {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl ErrorType for FaultyPin {
    type Error = PinFault;
}

impl OutputPin for FaultyPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        Err(PinFault)
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        Err(PinFault)
    }
}

impl StatefulOutputPin for FaultyPin {
    fn is_set_high(&mut self) -> Result<bool, PinFault> {
        Err(PinFault)
    }

    fn is_set_low(&mut self) -> Result<bool, PinFault> {
        Err(PinFault)
    }
}

/// Pulse output that only counts calls.
#[derive(Debug, Default)]
pub struct CountingPulse {
    pub width: u32,
    pub emitted: u32,
    pub released: u32,
    pub cancelled: u32,
}

impl CountingPulse {
    pub fn new(width_us: u32) -> Self {
        Self {
            width: width_us,
            ..Self::default()
        }
    }
}

impl StepPulse for CountingPulse {
    fn width(&self) -> Microseconds {
        Microseconds(self.width)
    }

    fn emit(&mut self) -> tick_stepper::Result<()> {
        self.emitted += 1;
        Ok(())
    }

    fn release(&mut self) -> tick_stepper::Result<()> {
        self.released += 1;
        Ok(())
    }

    fn cancel(&mut self) -> tick_stepper::Result<()> {
        self.cancelled += 1;
        Ok(())
    }
}
