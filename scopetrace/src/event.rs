use std::borrow::Cow;
use std::time::Duration;

/// One completed measurement of a named region.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Event<'a> {
    pub name: Cow<'a, str>,
    /// Time since the epoch of the recorder's clock at which the region was
    /// entered.
    pub start: Duration,
    /// Whole microseconds spent in the region.
    pub elapsed: Duration,
    pub thread_id: u64,
}

impl<'a> Event<'a> {
    pub fn new(
        name: impl Into<Cow<'a, str>>,
        start: Duration,
        elapsed: Duration,
        thread_id: u64,
    ) -> Event<'a> {
        Event {
            name: name.into(),
            start,
            elapsed: Duration::from_micros(elapsed.as_micros() as u64),
            thread_id,
        }
    }

    /// `start` as fractional microseconds, the unit of the `ts` field.
    #[inline]
    pub fn start_micros(&self) -> f64 {
        self.start.as_nanos() as f64 / 1_000.0
    }

    /// `elapsed` as whole microseconds, the unit of the `dur` field.
    #[inline]
    pub fn elapsed_micros(&self) -> u64 {
        self.elapsed.as_micros() as u64
    }
}
