use crate::clock::WallTime;
use crate::error::ProfilerError;
use crate::event::Event;
use crate::scope::TimingGuard;
use crate::serialization::{self, TraceSink, DEFAULT_TRACE_FILE, FOOTER, HEADER};
use log::{debug, warn};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::path::Path;

/// One open capture. Only ever reachable through the recorder's lock.
struct Session {
    name: String,
    sink: Box<dyn TraceSink>,
}

/// Records completed measurements into at most one open session at a time.
///
/// All state transitions and all writes to the sink happen under one lock, so
/// each record lands in the output in one piece, in the order the lock was
/// granted. Dropping the recorder ends an open session.
pub struct Recorder {
    session: Mutex<Option<Session>>,
    clock: WallTime,
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder {
            session: Mutex::new(None),
            clock: WallTime::new(),
        }
    }

    /// Opens a session writing to the file at `path`, creating or truncating
    /// it.
    ///
    /// Fails without side effects if a session is already open.
    pub fn begin_session<P: AsRef<Path>>(&self, name: &str, path: P) -> Result<(), ProfilerError> {
        let path = path.as_ref();
        let mut session = self.session.lock();
        check_idle(&session)?;

        let sink = serialization::open_file_sink(path)?;
        *session = Some(start_session(name, sink)?);
        debug!("began profiling session `{}` writing to {}", name, path.display());

        Ok(())
    }

    /// Like [`Recorder::begin_session`], writing to `result.json` in the
    /// current directory.
    pub fn begin_default_session(&self, name: &str) -> Result<(), ProfilerError> {
        self.begin_session(name, DEFAULT_TRACE_FILE)
    }

    /// Opens a session writing to a caller-supplied sink.
    pub fn begin_session_with_sink<S>(&self, name: &str, sink: S) -> Result<(), ProfilerError>
    where
        S: TraceSink + 'static,
    {
        let mut session = self.session.lock();
        check_idle(&session)?;

        *session = Some(start_session(name, Box::new(sink))?);
        debug!("began profiling session `{}`", name);

        Ok(())
    }

    /// Appends `event` to the open session and flushes it.
    ///
    /// If the write fails the session is closed without a footer and every
    /// later call fails with `NoActiveSession` until a new session begins.
    pub fn write_profile(&self, event: &Event<'_>) -> Result<(), ProfilerError> {
        let record = serialization::serialize_event(event);

        let mut slot = self.session.lock();
        let session = slot.as_mut().ok_or(ProfilerError::NoActiveSession)?;

        let result = session
            .sink
            .write_all(record.as_bytes())
            .and_then(|()| session.sink.flush());

        if let Err(e) = result {
            // Part of the record may already be in the sink; anything appended
            // after it would no longer parse, so the session is abandoned.
            if let Some(session) = slot.take() {
                warn!(
                    "abandoning profiling session `{}` after a failed write: {}",
                    session.name, e
                );
            }
            return Err(ProfilerError::Io(e));
        }

        Ok(())
    }

    /// Closes the open session, if any. Calling this while idle does nothing.
    pub fn end_session(&self) {
        let mut session = self.session.lock();
        // Footer and close happen while the lock is still held.
        if let Some(session) = session.take() {
            finish_session(session);
        }
    }

    pub fn is_session_open(&self) -> bool {
        self.session.lock().is_some()
    }

    /// The name of the open session, if any.
    pub fn session_name(&self) -> Option<String> {
        self.session.lock().as_ref().map(|session| session.name.clone())
    }

    /// Starts measuring a region. The returned guard submits one event to this
    /// recorder when it is dropped.
    #[inline]
    pub fn scope<N>(&self, name: N) -> TimingGuard<'_>
    where
        N: Into<Cow<'static, str>>,
    {
        TimingGuard::new(self, name.into())
    }

    #[inline]
    pub(crate) fn clock(&self) -> &WallTime {
        &self.clock
    }
}

fn check_idle(session: &Option<Session>) -> Result<(), ProfilerError> {
    match session {
        Some(open) => Err(ProfilerError::SessionAlreadyOpen {
            name: open.name.clone(),
        }),
        None => Ok(()),
    }
}

fn start_session(name: &str, mut sink: Box<dyn TraceSink>) -> Result<Session, ProfilerError> {
    sink.write_all(HEADER.as_bytes())?;
    sink.flush()?;

    Ok(Session {
        name: name.to_owned(),
        sink,
    })
}

fn finish_session(mut session: Session) {
    let result = session
        .sink
        .write_all(FOOTER.as_bytes())
        .and_then(|()| session.sink.flush());

    match result {
        Ok(()) => debug!("ended profiling session `{}`", session.name),
        Err(e) => warn!(
            "failed to finish profiling session `{}`: {}",
            session.name, e
        ),
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Recorder::new()
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            finish_session(session);
        }
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("session", &self.session_name())
            .finish()
    }
}

// Make sure that `Recorder` can be shared between threads.
fn _assert_bounds() {
    assert_bounds_inner(&Recorder::new());
    fn assert_bounds_inner<S: Sized + Send + Sync + 'static>(_: &S) {}
}
