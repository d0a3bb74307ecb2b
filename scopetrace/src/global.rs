//! The process-wide recorder behind the `begin_session!`, `end_session!` and
//! `profile_scope!` macros.
//!
//! Statics are never dropped, so the process-wide recorder does not end its
//! session at exit on its own: call `end_session!()` before returning from
//! `main`. A process that skips it still leaves every record on disk and only
//! misses the closing `]}`.
//!
//! Without the `enable` feature all three macros expand to nothing.

use crate::recorder::Recorder;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Recorder> = OnceLock::new();

/// The process-wide recorder, created on first use.
pub fn global() -> &'static Recorder {
    GLOBAL.get_or_init(Recorder::new)
}

/// Begins a session on the process-wide recorder.
///
/// `begin_session!(name)` writes to `result.json`,
/// `begin_session!(name, path)` writes to `path`. Evaluates to the
/// `Result` of the call.
#[cfg(feature = "enable")]
#[macro_export]
macro_rules! begin_session {
    ($name:expr) => {
        $crate::global().begin_default_session($name)
    };
    ($name:expr, $path:expr) => {
        $crate::global().begin_session($name, $path)
    };
}

#[cfg(not(feature = "enable"))]
#[macro_export]
macro_rules! begin_session {
    ($name:expr) => {
        ::std::result::Result::<(), $crate::ProfilerError>::Ok(())
    };
    ($name:expr, $path:expr) => {
        ::std::result::Result::<(), $crate::ProfilerError>::Ok(())
    };
}

/// Ends the session of the process-wide recorder, if one is open.
#[cfg(feature = "enable")]
#[macro_export]
macro_rules! end_session {
    () => {
        $crate::global().end_session()
    };
}

#[cfg(not(feature = "enable"))]
#[macro_export]
macro_rules! end_session {
    () => {};
}

/// Measures the rest of the enclosing block as a region called `name`.
///
/// ```
/// fn work() {
///     scopetrace::profile_scope!("work");
///     // ...
/// }
/// ```
#[cfg(feature = "enable")]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_scope_guard = $crate::global().scope($name);
    };
}

#[cfg(not(feature = "enable"))]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {};
}
