//! Interval accumulator used for per-state vehicle timing

use std::time::{Duration, Instant};

/// Sums the elapsed time of any number of start/stop intervals
///
/// Starting a running stopwatch keeps the original start point, and stopping
/// an idle one does nothing, so an interval is only ever counted once.
#[derive(Debug, Clone, Default)]
pub struct StopWatch {
    started_at: Option<Instant>,
    total: Duration,
    intervals: u32,
}

impl StopWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an interval at the current instant
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    /// Close the open interval and add it to the total
    ///
    /// Returns the length of the closed interval, or `None` if nothing was open.
    pub fn stop(&mut self) -> Option<Duration> {
        let started_at = self.started_at.take()?;
        let elapsed = started_at.elapsed();
        self.total += elapsed;
        self.intervals += 1;
        Some(elapsed)
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Sum of all closed intervals
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Number of closed intervals
    pub fn intervals(&self) -> u32 {
        self.intervals
    }
}
