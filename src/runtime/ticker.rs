//! Periodic tick source.
//!
//! A Tokio task that wakes the worker once per period through a [`Notify`].
//! `Notify` stores at most one permit, so ticks that arrive while the worker
//! is still busy collapse into a single wake instead of queueing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Shortest period accepted; `tokio::time::interval` panics on zero.
const MIN_PERIOD: Duration = Duration::from_micros(1);

/// Recurring timer driving the worker.
#[derive(Debug)]
pub struct TickSource {
    period: watch::Sender<Duration>,
    task: JoinHandle<()>,
}

impl TickSource {
    /// Start firing every `period`, first tick one period from now.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(period: Duration, wake: Arc<Notify>) -> Self {
        let (period, period_rx) = watch::channel(period.max(MIN_PERIOD));
        let task = tokio::spawn(run(period_rx, wake));
        Self { period, task }
    }

    /// Replace the schedule.
    ///
    /// The new period counts from now. A wake already stored by the old
    /// schedule is not withdrawn and may still be delivered once.
    pub fn rearm(&self, period: Duration) {
        let period = period.max(MIN_PERIOD);
        tracing::trace!(period_us = period.as_micros() as u64, "rearming tick source");
        self.period.send_replace(period);
    }

    /// Current period.
    pub fn period(&self) -> Duration {
        *self.period.borrow()
    }

    /// Stop firing.
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Whether the tick task has ended.
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(mut period_rx: watch::Receiver<Duration>, wake: Arc<Notify>) {
    loop {
        let period = *period_rx.borrow_and_update();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => wake.notify_one(),
                changed = period_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
            }
        }
    }
}
