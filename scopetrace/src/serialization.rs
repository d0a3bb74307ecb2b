//! Framing of the trace-event JSON document and the sinks it is written to.
//!
//! The document is streamed: the header goes out when a session begins, each
//! event is appended as one `,{...}` record as soon as it is submitted, and the
//! footer closes the array when the session ends. A trace cut short by a crash
//! is therefore only missing its footer.

use crate::error::ProfilerError;
use crate::event::Event;
use parking_lot::Mutex;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Opens the document and its event array. The array starts with an empty
/// placeholder object so that every real record can be prefixed by a comma.
pub const HEADER: &str = r#"{"otherData": {},"traceEvents":[{}"#;

/// Closes the event array and the document.
pub const FOOTER: &str = "]}";

/// The conventional destination when the caller does not name one.
pub const DEFAULT_TRACE_FILE: &str = "result.json";

/// The `TraceSink` is what the serialized trace gets written to.
pub trait TraceSink: Write + Send {}

impl<W: Write + Send> TraceSink for W {}

/// Serializes `event` as one complete ("X") trace event, including the
/// leading comma.
pub fn serialize_event(event: &Event<'_>) -> String {
    // Goes through serde_json so that quotes and control characters in a
    // region name can never break the document.
    let name = serde_json::Value::from(event.name.as_ref());

    format!(
        r#",{{"cat":"function","dur":{}.000,"name":{},"ph":"X","pid":0,"tid":{},"ts":{:.3}}}"#,
        event.elapsed_micros(),
        name,
        event.thread_id,
        event.start_micros(),
    )
}

pub(crate) fn open_file_sink(path: &Path) -> Result<Box<dyn TraceSink>, ProfilerError> {
    let file = fs::File::create(path).map_err(|source| ProfilerError::SinkOpen {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Box::new(BufWriter::new(file)))
}

/// An in-memory sink that can be handed to a recorder while the caller keeps a
/// handle to read back everything written so far, including after the session
/// that owned it has ended.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    data: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> SharedBuffer {
        SharedBuffer::default()
    }

    /// Create a copy of all data written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.data.lock()).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.data.lock().extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
