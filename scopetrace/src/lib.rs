//! A lightweight in-process tracer.
//!
//! A [`Recorder`] owns at most one open session. Regions of code are measured
//! with [`TimingGuard`]s obtained from [`Recorder::scope`]; each guard submits
//! one [`Event`] when it is dropped. Events are streamed to the session's sink
//! as Chrome trace-event JSON (`chrome://tracing`, Perfetto) and flushed one by
//! one, so a process that dies mid-session still leaves a usable trace behind.
//!
//! ```no_run
//! let recorder = scopetrace::Recorder::new();
//! recorder.begin_session("startup", "startup.json")?;
//! {
//!     let _guard = recorder.scope("load_config");
//!     // ...
//! }
//! recorder.end_session();
//! # Ok::<(), scopetrace::ProfilerError>(())
//! ```

mod clock;
mod error;
mod event;
mod global;
mod recorder;
mod scope;
mod serialization;

pub mod testing_common;

pub use crate::error::ProfilerError;
pub use crate::event::Event;
pub use crate::global::global;
pub use crate::recorder::Recorder;
pub use crate::scope::TimingGuard;
pub use crate::serialization::{
    serialize_event, SharedBuffer, TraceSink, DEFAULT_TRACE_FILE, FOOTER, HEADER,
};
