//! The monotonic clock every timestamp in a trace is measured against.
//!
//! A [`WallTime`] is anchored at the [`Instant`] it was created at; readings are
//! nanoseconds since that anchor. Because it is built on [`Instant`], clock
//! adjustments of the system wall clock never make a measurement jump or go
//! backwards.

use std::time::{Duration, Instant};

/// "Monotonic clock" with nanosecond precision (using [`std::time::Instant`]).
#[derive(Debug, Clone, Copy)]
pub struct WallTime {
    start: Instant,
}

impl WallTime {
    pub fn new() -> Self {
        WallTime {
            start: Instant::now(),
        }
    }

    /// Nanoseconds elapsed since the clock was created.
    #[inline]
    pub fn since_start(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
}

impl Default for WallTime {
    fn default() -> Self {
        WallTime::new()
    }
}

/// Truncates a nanosecond reading to whole microseconds.
#[inline]
pub(crate) fn whole_micros(nanos: u64) -> u64 {
    nanos / 1_000
}

/// The elapsed time between two readings, with both ends truncated to whole
/// microseconds first. A reading taken "before" `start` yields zero.
#[inline]
pub(crate) fn elapsed_between(start_ns: u64, end_ns: u64) -> Duration {
    Duration::from_micros(whole_micros(end_ns).saturating_sub(whole_micros(start_ns)))
}
