use crate::clock;
use crate::error::ProfilerError;
use crate::event::Event;
use crate::recorder::Recorder;
use log::{debug, warn};
use std::borrow::Cow;
use std::time::Duration;

/// When dropped, this `TimingGuard` will record one event covering its whole
/// lifetime in the `Recorder` it was created by.
///
/// The event is recorded no matter how the scope is left: normal return, early
/// return, `?`, or a panic unwinding through it. Recording is best effort: if
/// the recorder has no open session, or the write fails, the failure is logged
/// and otherwise ignored.
#[must_use = "the region is measured until the guard is dropped"]
pub struct TimingGuard<'a> {
    recorder: &'a Recorder,
    name: Cow<'static, str>,
    start_ns: u64,
    finished: bool,
}

impl<'a> TimingGuard<'a> {
    #[inline]
    pub(crate) fn new(recorder: &'a Recorder, name: Cow<'static, str>) -> TimingGuard<'a> {
        TimingGuard {
            recorder,
            name,
            start_ns: recorder.clock().since_start(),
            finished: false,
        }
    }

    /// Ends the measurement now and reports whether the event was recorded.
    pub fn finish(mut self) -> Result<(), ProfilerError> {
        let result = self.submit();
        self.finished = true;
        result
    }

    fn submit(&self) -> Result<(), ProfilerError> {
        let end_ns = self.recorder.clock().since_start();
        let event = Event::new(
            &*self.name,
            Duration::from_nanos(self.start_ns),
            clock::elapsed_between(self.start_ns, end_ns),
            thread_id::get() as u64,
        );

        self.recorder.write_profile(&event)
    }
}

impl<'a> Drop for TimingGuard<'a> {
    #[inline]
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        match self.submit() {
            Ok(()) => {}
            Err(ProfilerError::NoActiveSession) => {
                debug!("dropped event `{}`: no opened profiling session", self.name)
            }
            Err(e) => warn!("dropped event `{}`: {}", self.name, e),
        }
    }
}
